//! Organization handlers: canonical create and admin management.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use impacts_core::models::{
    CreateOrganizationRequest, CreatedOrganization, Organization, OrganizationDetail,
    OrganizationFilter, UpdateOrganizationRequest, VerificationLevel,
};
use impacts_core::validation::page_window;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListOrganizationsQuery {
    /// 1-based page number
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sector: Option<String>,
    pub region: Option<String>,
    /// Case-insensitive substring of the name
    pub search: Option<String>,
    pub verification_level: Option<VerificationLevel>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationListResponse {
    pub organizations: Vec<Organization>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Create one organization from the canonical shape
#[utoipa::path(
    post,
    path = "/api/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = CreatedOrganization),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid admin key", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let created = state.organizations.create(request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List organizations, newest first
#[utoipa::path(
    get,
    path = "/api/organizations",
    params(ListOrganizationsQuery),
    responses(
        (status = 200, description = "One page of organizations", body = OrganizationListResponse),
        (status = 401, description = "Missing or invalid admin key", body = ErrorResponse)
    ),
    tag = "organizations"
)]
#[tracing::instrument(skip(state))]
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrganizationsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = page_window(query.page, query.limit);
    let filter = OrganizationFilter {
        sector: non_blank(query.sector),
        region: non_blank(query.region),
        search: non_blank(query.search),
        verification_level: query.verification_level,
        limit,
        offset,
    };
    let page = state.organizations.list(filter).await?;
    Ok(Json(OrganizationListResponse {
        organizations: page.items,
        total: page.total,
        page: offset / limit + 1,
        limit,
    }))
}

/// Get an organization with its programs, metrics and partners
#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization detail", body = OrganizationDetail),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.organizations.get(id).await?))
}

/// Partially update an organization. Last write wins.
#[utoipa::path(
    put,
    path = "/api/organizations/{id}",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = UpdateOrganizationRequest,
    responses(
        (status = 200, description = "Updated organization", body = Organization),
        (status = 400, description = "Validation failed or nothing to update", body = ErrorResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn update_organization(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(update): ValidatedJson<UpdateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.organizations.update(id, update).await?))
}

/// Delete an organization and everything it owns
#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 204, description = "Organization deleted"),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "organizations"
)]
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.organizations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
