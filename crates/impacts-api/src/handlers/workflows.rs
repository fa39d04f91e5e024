//! Workflow handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use impacts_core::models::{CreateWorkflowRequest, UpdateWorkflowRequest, Workflow};
use impacts_core::validation::page_window;
use impacts_core::WorkflowRun;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListWorkflowsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunWorkflowRequest {
    pub organization_id: Uuid,
}

#[utoipa::path(
    post,
    path = "/api/workflows",
    request_body = CreateWorkflowRequest,
    responses(
        (status = 201, description = "Workflow created", body = Workflow),
        (status = 400, description = "Invalid name or steps", body = ErrorResponse)
    ),
    tag = "workflows"
)]
pub async fn create_workflow(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateWorkflowRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let workflow = state.workflows.create(request).await?;
    Ok((StatusCode::CREATED, Json(workflow)))
}

#[utoipa::path(
    get,
    path = "/api/workflows",
    params(ListWorkflowsQuery),
    responses(
        (status = 200, description = "Workflows sorted by name", body = Vec<Workflow>)
    ),
    tag = "workflows"
)]
pub async fn list_workflows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListWorkflowsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = page_window(query.page, query.limit);
    Ok(Json(state.workflows.list(limit, offset).await?))
}

#[utoipa::path(
    get,
    path = "/api/workflows/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 200, description = "Workflow", body = Workflow),
        (status = 404, description = "Workflow not found", body = ErrorResponse)
    ),
    tag = "workflows"
)]
pub async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.workflows.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/workflows/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = UpdateWorkflowRequest,
    responses(
        (status = 200, description = "Workflow updated", body = Workflow),
        (status = 400, description = "Invalid name or steps", body = ErrorResponse),
        (status = 404, description = "Workflow not found", body = ErrorResponse)
    ),
    tag = "workflows"
)]
pub async fn update_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(update): ValidatedJson<UpdateWorkflowRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.workflows.update(id, update).await?))
}

#[utoipa::path(
    delete,
    path = "/api/workflows/{id}",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    responses(
        (status = 204, description = "Workflow deleted"),
        (status = 404, description = "Workflow not found", body = ErrorResponse)
    ),
    tag = "workflows"
)]
pub async fn delete_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.workflows.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run a workflow against one organization and persist its changes
#[utoipa::path(
    post,
    path = "/api/workflows/{id}/run",
    params(("id" = Uuid, Path, description = "Workflow ID")),
    request_body = RunWorkflowRequest,
    responses(
        (status = 200, description = "Execution report", body = WorkflowRun),
        (status = 404, description = "Workflow or organization not found", body = ErrorResponse),
        (status = 409, description = "Workflow is inactive", body = ErrorResponse)
    ),
    tag = "workflows"
)]
pub async fn run_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<RunWorkflowRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let run = state.workflows.run(id, request.organization_id).await?;
    Ok(Json(run))
}
