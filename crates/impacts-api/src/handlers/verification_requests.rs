//! Verification queue handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use impacts_core::models::{
    AssignVerificationRequest, CreateVerificationRequest, ProcessVerificationRequest,
    VerificationRequest, VerificationStatus,
};
use impacts_core::validation::page_window;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListVerificationRequestsQuery {
    pub status: Option<VerificationStatus>,
    pub organization_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/api/verification-requests",
    request_body = CreateVerificationRequest,
    responses(
        (status = 201, description = "Request opened", body = VerificationRequest),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "verification"
)]
pub async fn create_verification_request(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateVerificationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let created = state.verifications.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Review queue, oldest first
#[utoipa::path(
    get,
    path = "/api/verification-requests",
    params(ListVerificationRequestsQuery),
    responses(
        (status = 200, description = "Verification requests", body = Vec<VerificationRequest>)
    ),
    tag = "verification"
)]
pub async fn list_verification_requests(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListVerificationRequestsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = page_window(query.page, query.limit);
    let requests = state
        .verifications
        .list(query.status, query.organization_id, limit, offset)
        .await?;
    Ok(Json(requests))
}

#[utoipa::path(
    post,
    path = "/api/verification-requests/{id}/assign",
    params(("id" = Uuid, Path, description = "Verification request ID")),
    request_body = AssignVerificationRequest,
    responses(
        (status = 200, description = "Assignee set", body = VerificationRequest),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Verification request not found", body = ErrorResponse)
    ),
    tag = "verification"
)]
pub async fn assign_verification_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AssignVerificationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    Ok(Json(state.verifications.assign(id, &request.assigned_to).await?))
}

/// Approve or reject. Approval raises the organization's verification level.
#[utoipa::path(
    post,
    path = "/api/verification-requests/{id}/process",
    params(("id" = Uuid, Path, description = "Verification request ID")),
    request_body = ProcessVerificationRequest,
    responses(
        (status = 200, description = "Decision recorded", body = VerificationRequest),
        (status = 404, description = "Verification request not found", body = ErrorResponse),
        (status = 409, description = "Request already decided", body = ErrorResponse)
    ),
    tag = "verification"
)]
pub async fn process_verification_request(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(decision): ValidatedJson<ProcessVerificationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.verifications.process(id, decision).await?))
}
