use crate::handlers::{list_forms, submit_form};
use crate::server::AppState;
use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/system/{system_id}/form/submit",
        get(list_forms).post(submit_form),
    )
}
