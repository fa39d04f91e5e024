//! Verification queue: open, assign and decide verification requests.

use std::sync::Arc;

use impacts_core::models::{
    CreateVerificationRequest, ProcessVerificationRequest, UpdateOrganizationRequest,
    VerificationRequest, VerificationStatus,
};
use impacts_core::AppError;
use impacts_db::{OrganizationRepository, Repositories, VerificationRepository};
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct VerificationService {
    requests: Arc<dyn VerificationRepository>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl VerificationService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            requests: repos.verifications.clone(),
            organizations: repos.organizations.clone(),
        }
    }

    async fn load(&self, id: Uuid) -> Result<VerificationRequest, AppError> {
        self.requests
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Verification request {} not found", id)))
    }

    pub async fn create(
        &self,
        request: CreateVerificationRequest,
    ) -> Result<VerificationRequest, AppError> {
        if self.organizations.get(request.organization_id).await?.is_none() {
            return Err(AppError::OrganizationNotFound(format!(
                "Organization {} not found",
                request.organization_id
            )));
        }
        let created = self
            .requests
            .create(request.organization_id, request.request_type)
            .await?;
        tracing::info!(
            request_id = %created.id,
            organization_id = %created.organization_id,
            request_type = %created.request_type,
            "Verification request opened"
        );
        Ok(created)
    }

    pub async fn list(
        &self,
        status: Option<VerificationStatus>,
        organization_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VerificationRequest>, AppError> {
        Ok(self
            .requests
            .list(status, organization_id, limit, offset)
            .await?)
    }

    pub async fn assign(&self, id: Uuid, assigned_to: &str) -> Result<VerificationRequest, AppError> {
        let assignee = assigned_to.trim();
        if assignee.is_empty() {
            return Err(AppError::InvalidInput("Assignee is required".to_string()));
        }
        self.requests
            .assign(id, assignee)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Verification request {} not found", id)))
    }

    /// Approve or reject a pending request. Approval raises the organization's
    /// verification level to the requested one.
    pub async fn process(
        &self,
        id: Uuid,
        decision: ProcessVerificationRequest,
    ) -> Result<VerificationRequest, AppError> {
        decision.validate()?;
        let current = self.load(id).await?;
        let status = current.decide(decision.decision)?;

        // A concurrent decision may land first; the repository only updates pending rows.
        let decided = self
            .requests
            .decide(id, status, decision.review_notes.trim())
            .await?
            .ok_or_else(|| {
                AppError::InvalidTransition("Verification request is no longer pending".to_string())
            })?;

        if decided.status == VerificationStatus::Approved {
            let update = UpdateOrganizationRequest {
                verification_level: Some(decided.request_type),
                ..Default::default()
            };
            if self
                .organizations
                .update(decided.organization_id, &update)
                .await?
                .is_none()
            {
                tracing::warn!(
                    organization_id = %decided.organization_id,
                    "Approved verification for an organization that no longer exists"
                );
            }
        }

        tracing::info!(
            request_id = %id,
            status = decided.status.as_str(),
            "Verification request processed"
        );
        Ok(decided)
    }
}
