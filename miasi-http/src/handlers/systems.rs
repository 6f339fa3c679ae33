use crate::error::AppError;
use crate::models::{ErrorResponse, FieldInfo, ListSystemsResponse, SystemDetailResponse};
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};

use super::parse_system_id;

/// List systems
///
/// Returns every system of the catalog, ordered by id.
#[utoipa::path(
    get,
    path = "/systems",
    responses(
        (status = 200, description = "Systems listed successfully", body = ListSystemsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_systems(
    State(state): State<AppState>,
) -> Result<Json<ListSystemsResponse>, AppError> {
    let systems = state.service.list_systems().await?;
    Ok(Json(ListSystemsResponse { systems }))
}

/// Get a system
///
/// Returns the system together with the fields a submission must provide.
#[utoipa::path(
    get,
    path = "/systems/{system_id}",
    responses(
        (status = 200, description = "System retrieved successfully", body = SystemDetailResponse),
        (status = 404, description = "System not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    params(
        ("system_id" = i64, Path, description = "System identifier")
    )
)]
pub async fn get_system(
    State(state): State<AppState>,
    Path(system_id): Path<String>,
) -> Result<Json<SystemDetailResponse>, AppError> {
    let id = parse_system_id(&system_id)?;
    let (system, fields) = state.service.required_fields(id).await?;
    Ok(Json(SystemDetailResponse {
        system,
        fields: fields.into_iter().map(FieldInfo::from).collect(),
    }))
}
