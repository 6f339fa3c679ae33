use crate::handlers::{get_system, list_systems};
use crate::server::AppState;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/systems", get(list_systems))
        .route("/systems/{system_id}", get(get_system))
}
