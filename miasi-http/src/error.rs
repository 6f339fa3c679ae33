//! Error handling for miasi-http
//!
//! Maps core errors onto HTTP responses of the form
//! `{"error": <message>, "kind": <not_found|validation|evaluation|internal>}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use miasi_core::{Error, ErrorKind};

use crate::models::ErrorResponse;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Error raised by the core
    Core(Error),

    /// The path does not name a system
    UnknownPath(String),
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self::Core(err)
    }
}

impl PartialEq<StatusCode> for AppError {
    fn eq(&self, status_code: &StatusCode) -> bool {
        &self.status() == status_code
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(err) => err.kind(),
            Self::UnknownPath(_) => ErrorKind::NotFound,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Evaluation | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Core(err) => err.to_string(),
            Self::UnknownPath(_) => "System not found".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.message(),
            kind: self.kind(),
        });

        (status, body).into_response()
    }
}
