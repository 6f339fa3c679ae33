use axum::Router;
use miasi_core::{
    SubmissionService,
    catalog::{self, CatalogStore},
    config::{CatalogConfig, EngineConfig},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes::create_api_router;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            engine: EngineConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: SubmissionService,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogStore>, engine: EngineConfig) -> Self {
        Self {
            service: SubmissionService::new(catalog, engine),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(catalog::open(&config.catalog), config.engine.clone())
    }
}

/// The full application: routes, state, tracing and CORS layers.
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::from_config(&config);
    info!(catalog = ?config.catalog, "Opened catalog");

    let app = build_app(state);

    let addr = format!("{}:{}", config.host, config.port).parse::<SocketAddr>()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
