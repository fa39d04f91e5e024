//! Admin invitations

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use impacts_core::models::{CreateInvitationRequest, Invitation, InvitationStatus};
use impacts_core::validation::page_window;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListInvitationsQuery {
    pub status: Option<InvitationStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AcceptInvitationRequest {
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/api/invitations",
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation issued", body = Invitation),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateInvitationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let invitation = state.invitations.create(request).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

#[utoipa::path(
    get,
    path = "/api/invitations",
    params(ListInvitationsQuery),
    responses(
        (status = 200, description = "Invitations, newest first", body = Vec<Invitation>)
    ),
    tag = "invitations"
)]
pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListInvitationsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = page_window(query.page, query.limit);
    Ok(Json(state.invitations.list(query.status, limit, offset).await?))
}

/// Rotate the token and renew the expiry of a pending or expired invitation
#[utoipa::path(
    post,
    path = "/api/invitations/{id}/resend",
    params(("id" = Uuid, Path, description = "Invitation ID")),
    responses(
        (status = 200, description = "Invitation resent", body = Invitation),
        (status = 404, description = "Invitation not found", body = ErrorResponse),
        (status = 409, description = "Invitation already accepted", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn resend_invitation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.invitations.resend(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/invitations/{id}/cancel",
    params(("id" = Uuid, Path, description = "Invitation ID")),
    responses(
        (status = 200, description = "Invitation cancelled", body = Invitation),
        (status = 404, description = "Invitation not found", body = ErrorResponse),
        (status = 409, description = "Invitation is not pending", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn cancel_invitation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.invitations.cancel(id).await?))
}

/// Accept an invitation with the token it was issued with. Needs no admin key.
#[utoipa::path(
    post,
    path = "/api/invitations/{id}/accept",
    params(("id" = Uuid, Path, description = "Invitation ID")),
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Invitation accepted", body = Invitation),
        (status = 401, description = "Token does not match", body = ErrorResponse),
        (status = 404, description = "Invitation not found", body = ErrorResponse),
        (status = 409, description = "Invitation is not pending or has expired", body = ErrorResponse)
    ),
    tag = "invitations"
)]
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.invitations.accept(id, request.token.trim()).await?))
}
