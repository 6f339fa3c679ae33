use miasi_core::{ErrorKind, catalog::System, pipeline::SubmissionOutcome};
use miasi_http::models::{ErrorResponse, ListSystemsResponse, SystemDetailResponse};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        kind: Option<ErrorKind>,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Client for a running `miasi-http` server.
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_systems(&self) -> ApiResult<Vec<System>> {
        let url = format!("{}/api/v1/systems", self.base_url);
        let response = self.client.get(&url).send().await?;
        let data: ListSystemsResponse = decode(response).await?;
        Ok(data.systems)
    }

    pub async fn get_system(&self, id: i64) -> ApiResult<SystemDetailResponse> {
        let url = format!("{}/api/v1/systems/{}", self.base_url, id);
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    pub async fn submit(&self, id: i64, payload: &JsonValue) -> ApiResult<SubmissionOutcome> {
        let url = format!("{}/api/v1/system/{}/form/submit", self.base_url, id);
        tracing::debug!(%url, "submitting form");
        let response = self.client.post(&url).json(payload).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let (message, kind) = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error) => (error.error, Some(error.kind)),
        Err(_) if body.is_empty() => (status.to_string(), None),
        Err(_) => (body, None),
    };
    Err(ApiError::Api {
        status: status.as_u16(),
        message,
        kind,
    })
}
