//! Workflow service: CRUD with step validation, and running a workflow
//! against one organization.

use std::sync::Arc;

use impacts_core::models::{CreateWorkflowRequest, UpdateWorkflowRequest, Workflow};
use impacts_core::{run_workflow, validate_steps, AppError, WorkflowRun};
use impacts_db::{OrganizationRepository, Repositories, WorkflowRepository};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct WorkflowService {
    workflows: Arc<dyn WorkflowRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Workflow {} not found", id))
}

impl WorkflowService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            workflows: repos.workflows.clone(),
            organizations: repos.organizations.clone(),
        }
    }

    pub async fn create(&self, request: CreateWorkflowRequest) -> Result<Workflow, AppError> {
        request.validate()?;
        validate_steps(&request.steps)?;
        let workflow = self.workflows.create(request).await?;
        tracing::info!(
            workflow_id = %workflow.id,
            steps = workflow.steps.len(),
            "Workflow created"
        );
        Ok(workflow)
    }

    pub async fn get(&self, id: Uuid) -> Result<Workflow, AppError> {
        self.workflows.get(id).await?.ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Workflow>, AppError> {
        Ok(self.workflows.list(limit, offset).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        update: UpdateWorkflowRequest,
    ) -> Result<Workflow, AppError> {
        update.validate()?;
        if let Some(steps) = &update.steps {
            validate_steps(steps)?;
        }
        self.workflows
            .update(id, update)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.workflows.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(workflow_id = %id, "Workflow deleted");
        Ok(())
    }

    /// Interpret the workflow against the organization and persist whatever
    /// its actions changed.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, id: Uuid, organization_id: Uuid) -> Result<WorkflowRun, AppError> {
        let workflow = self.get(id).await?;
        let org = self
            .organizations
            .get(organization_id)
            .await?
            .ok_or_else(|| {
                AppError::OrganizationNotFound(format!(
                    "Organization {} not found",
                    organization_id
                ))
            })?;

        let run = run_workflow(&workflow, &org)?;
        if !run.changes.is_empty() {
            self.organizations
                .update(organization_id, &run.changes)
                .await?
                .ok_or_else(|| {
                    AppError::OrganizationNotFound(format!(
                        "Organization {} not found",
                        organization_id
                    ))
                })?;
        }

        tracing::info!(
            outcome = ?run.outcome,
            steps_executed = run.steps_executed,
            "Workflow run finished"
        );
        Ok(run)
    }
}
