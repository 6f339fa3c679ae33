use crate::error::AppError;
use crate::models::{ErrorResponse, FieldInfo, FormsResponse, SubmissionOutcome, SubmissionPayload};
use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use super::parse_system_id;

/// List form fields
///
/// Returns the fields linked to the system.
#[utoipa::path(
    get,
    path = "/system/{system_id}/form/submit",
    responses(
        (status = 200, description = "Fields listed successfully", body = FormsResponse),
        (status = 404, description = "System not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("system_id" = i64, Path, description = "System identifier")
    )
)]
pub async fn list_forms(
    State(state): State<AppState>,
    Path(system_id): Path<String>,
) -> Result<Json<FormsResponse>, AppError> {
    let id = parse_system_id(&system_id)?;
    let (_, fields) = state.service.required_fields(id).await?;
    Ok(Json(FormsResponse {
        forms: fields.into_iter().map(FieldInfo::from).collect(),
    }))
}

/// Submit a form
///
/// Evaluates the system's equations for the submitted values and returns
/// the reported results with the matching advice.
#[utoipa::path(
    post,
    path = "/system/{system_id}/form/submit",
    request_body = SubmissionPayload,
    responses(
        (status = 201, description = "Equations calculated", body = SubmissionOutcome),
        (status = 400, description = "Missing or invalid data", body = ErrorResponse),
        (status = 404, description = "System not found or no equation applies", body = ErrorResponse),
        (status = 500, description = "Defective formula, condition or rule", body = ErrorResponse)
    ),
    params(
        ("system_id" = i64, Path, description = "System identifier")
    )
)]
pub async fn submit_form(
    State(state): State<AppState>,
    Path(system_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<SubmissionOutcome>), AppError> {
    let id = parse_system_id(&system_id)?;
    let outcome = state.service.submit_body(id, &body).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
