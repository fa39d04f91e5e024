//! Invitation service: issue, resend, cancel and accept admin invitations.

use std::sync::Arc;

use chrono::{Duration, Utc};
use impacts_core::models::{CreateInvitationRequest, Invitation, InvitationStatus};
use impacts_core::AppError;
use impacts_db::{InvitationRepository, OrganizationRepository, Repositories};
use rand::RngCore;
use subtle::ConstantTimeEq;
use uuid::Uuid;
use validator::Validate;

use crate::constants::INVITATION_TOKEN_BYTES;

#[derive(Clone)]
pub struct InvitationService {
    invitations: Arc<dyn InvitationRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    expiry: Duration,
}

fn generate_token() -> String {
    let mut bytes = [0u8; INVITATION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn tokens_match(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

impl InvitationService {
    pub fn new(repos: &Repositories, expiry_days: i64) -> Self {
        Self {
            invitations: repos.invitations.clone(),
            organizations: repos.organizations.clone(),
            expiry: Duration::days(expiry_days),
        }
    }

    async fn load(&self, id: Uuid) -> Result<Invitation, AppError> {
        self.invitations
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invitation {} not found", id)))
    }

    async fn store(&self, invitation: &Invitation) -> Result<Invitation, AppError> {
        self.invitations
            .save(invitation)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Invitation {} not found", invitation.id)))
    }

    pub async fn create(&self, request: CreateInvitationRequest) -> Result<Invitation, AppError> {
        request.validate()?;
        if let Some(org_id) = request.organization_id {
            if self.organizations.get(org_id).await?.is_none() {
                return Err(AppError::OrganizationNotFound(format!(
                    "Organization {} not found",
                    org_id
                )));
            }
        }

        let now = Utc::now();
        let invitation = Invitation {
            id: Uuid::new_v4(),
            email: request.email.trim().to_lowercase(),
            role: request.role.trim().to_string(),
            organization_id: request.organization_id,
            status: InvitationStatus::Pending,
            token: generate_token(),
            expires_at: now + self.expiry,
            created_at: now,
            updated_at: now,
        };
        let created = self.invitations.create(&invitation).await?;
        tracing::info!(invitation_id = %created.id, role = %created.role, "Invitation created");
        Ok(created)
    }

    pub async fn list(
        &self,
        status: Option<InvitationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invitation>, AppError> {
        Ok(self.invitations.list(status, limit, offset).await?)
    }

    /// Issue a fresh token and push the expiry forward.
    pub async fn resend(&self, id: Uuid) -> Result<Invitation, AppError> {
        let mut invitation = self.load(id).await?;
        invitation.ensure_resendable()?;
        let now = Utc::now();
        invitation.status = InvitationStatus::Pending;
        invitation.token = generate_token();
        invitation.expires_at = now + self.expiry;
        invitation.updated_at = now;
        let saved = self.store(&invitation).await?;
        tracing::info!(invitation_id = %id, "Invitation resent");
        Ok(saved)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Invitation, AppError> {
        let mut invitation = self.load(id).await?;
        invitation.ensure_cancellable()?;
        invitation.status = InvitationStatus::Expired;
        invitation.updated_at = Utc::now();
        let saved = self.store(&invitation).await?;
        tracing::info!(invitation_id = %id, "Invitation cancelled");
        Ok(saved)
    }

    pub async fn accept(&self, id: Uuid, token: &str) -> Result<Invitation, AppError> {
        let mut invitation = self.load(id).await?;
        let now = Utc::now();
        invitation.ensure_acceptable(now)?;
        if !tokens_match(token, &invitation.token) {
            tracing::warn!(invitation_id = %id, "Invitation accept with wrong token");
            return Err(AppError::Unauthorized("Invalid invitation token".to_string()));
        }
        invitation.status = InvitationStatus::Accepted;
        invitation.updated_at = now;
        let saved = self.store(&invitation).await?;
        tracing::info!(invitation_id = %id, "Invitation accepted");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> InvitationService {
        InvitationService::new(&Repositories::in_memory(), 7)
    }

    fn request() -> CreateInvitationRequest {
        CreateInvitationRequest {
            email: "Reviewer@Example.org".to_string(),
            role: "reviewer".to_string(),
            organization_id: None,
        }
    }

    #[test]
    fn tokens_are_hex_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), INVITATION_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
        assert!(tokens_match(&a, &a.clone()));
        assert!(!tokens_match(&a, &b));
        assert!(!tokens_match(&a, "short"));
    }

    #[tokio::test]
    async fn create_normalizes_email_and_sets_expiry() {
        let invitation = service().create(request()).await.unwrap();
        assert_eq!(invitation.email, "reviewer@example.org");
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert!(invitation.expires_at > invitation.created_at + Duration::days(6));
    }

    #[tokio::test]
    async fn create_rejects_unknown_organization() {
        let mut req = request();
        req.organization_id = Some(Uuid::new_v4());
        let err = service().create(req).await.unwrap_err();
        assert!(matches!(err, AppError::OrganizationNotFound(_)));
    }

    #[tokio::test]
    async fn resend_rotates_token() {
        let svc = service();
        let invitation = svc.create(request()).await.unwrap();
        let resent = svc.resend(invitation.id).await.unwrap();
        assert_ne!(resent.token, invitation.token);
        assert_eq!(resent.status, InvitationStatus::Pending);
    }

    #[tokio::test]
    async fn cancel_then_accept_fails() {
        let svc = service();
        let invitation = svc.create(request()).await.unwrap();
        let cancelled = svc.cancel(invitation.id).await.unwrap();
        assert_eq!(cancelled.status, InvitationStatus::Expired);
        let err = svc.accept(invitation.id, &invitation.token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));

        // An expired invitation can be renewed and then accepted.
        let renewed = svc.resend(invitation.id).await.unwrap();
        let accepted = svc.accept(invitation.id, &renewed.token).await.unwrap();
        assert_eq!(accepted.status, InvitationStatus::Accepted);
    }

    #[tokio::test]
    async fn accept_checks_token() {
        let svc = service();
        let invitation = svc.create(request()).await.unwrap();
        let err = svc.accept(invitation.id, "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert!(svc.accept(invitation.id, &invitation.token).await.is_ok());
        let err = svc.resend(invitation.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }
}
