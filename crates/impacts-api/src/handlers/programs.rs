//! Programs owned by an organization

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use impacts_core::models::{NewProgram, Program};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/organizations/{id}/programs",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Programs of the organization", body = Vec<Program>),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "programs"
)]
pub async fn list_programs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.organizations.list_programs(id).await?))
}

/// Add a program; the organization's program and beneficiary counts follow.
#[utoipa::path(
    post,
    path = "/api/organizations/{id}/programs",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = NewProgram,
    responses(
        (status = 201, description = "Program created", body = Program),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "programs"
)]
pub async fn create_program(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(program): ValidatedJson<NewProgram>,
) -> Result<impl IntoResponse, HttpAppError> {
    let program = state.organizations.add_program(id, program).await?;
    Ok((StatusCode::CREATED, Json(program)))
}
