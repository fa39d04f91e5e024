use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Invitation status (matches database enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "invitation_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Expired => "expired",
        }
    }
}

/// Invitation sent by an admin (database row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub organization_id: Option<Uuid>,
    pub status: InvitationStatus,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    #[validate(email(message = "Invitation email must be a valid email address"))]
    pub email: String,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Role must be between 1 and 50 characters"
    ))]
    pub role: String,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
}

impl Invitation {
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Resending renews a pending or expired invitation; accepted ones are final.
    pub fn ensure_resendable(&self) -> Result<(), AppError> {
        match self.status {
            InvitationStatus::Accepted => Err(AppError::InvalidTransition(
                "Invitation has already been accepted".to_string(),
            )),
            InvitationStatus::Pending | InvitationStatus::Expired => Ok(()),
        }
    }

    pub fn ensure_cancellable(&self) -> Result<(), AppError> {
        match self.status {
            InvitationStatus::Pending => Ok(()),
            InvitationStatus::Accepted => Err(AppError::InvalidTransition(
                "Invitation has already been accepted".to_string(),
            )),
            InvitationStatus::Expired => Err(AppError::InvalidTransition(
                "Invitation is already expired".to_string(),
            )),
        }
    }

    /// Accepting requires a pending invitation still inside its expiry window.
    /// Expiry is checked lazily here; nothing sweeps stale invitations.
    pub fn ensure_acceptable(&self, now: DateTime<Utc>) -> Result<(), AppError> {
        if self.status != InvitationStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Invitation is {}",
                self.status.as_str()
            )));
        }
        if self.is_past_expiry(now) {
            return Err(AppError::InvalidTransition(
                "Invitation has expired".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invitation(status: InvitationStatus, expires_in_days: i64) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            email: "reviewer@example.org".to_string(),
            role: "reviewer".to_string(),
            organization_id: None,
            status,
            token: "abc".to_string(),
            expires_at: now + Duration::days(expires_in_days),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn accept_requires_pending_and_unexpired() {
        let now = Utc::now();
        assert!(invitation(InvitationStatus::Pending, 7)
            .ensure_acceptable(now)
            .is_ok());
        assert!(invitation(InvitationStatus::Pending, -1)
            .ensure_acceptable(now)
            .is_err());
        let err = invitation(InvitationStatus::Accepted, 7)
            .ensure_acceptable(now)
            .unwrap_err();
        assert!(err.to_string().contains("accepted"));
    }

    #[test]
    fn resend_and_cancel_rules() {
        assert!(invitation(InvitationStatus::Expired, -1)
            .ensure_resendable()
            .is_ok());
        assert!(invitation(InvitationStatus::Accepted, 7)
            .ensure_resendable()
            .is_err());
        assert!(invitation(InvitationStatus::Pending, 7)
            .ensure_cancellable()
            .is_ok());
        assert!(invitation(InvitationStatus::Expired, 7)
            .ensure_cancellable()
            .is_err());
    }

    #[test]
    fn create_request_validation() {
        let req = CreateInvitationRequest {
            email: "not-an-email".to_string(),
            role: String::new(),
            organization_id: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("role"));
    }
}
