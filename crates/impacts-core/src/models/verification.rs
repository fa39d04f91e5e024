use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::organization::VerificationLevel;
use crate::error::AppError;

/// Verification request status (matches database enum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "verification_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

/// Request to raise an organization's verification level (database row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub request_type: VerificationLevel,
    pub status: VerificationStatus,
    pub assigned_to: Option<String>,
    pub review_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVerificationRequest {
    pub organization_id: Uuid,
    pub request_type: VerificationLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignVerificationRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Assignee must be between 1 and 255 characters"
    ))]
    pub assigned_to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProcessVerificationRequest {
    pub decision: VerificationDecision,
    #[serde(default)]
    #[validate(length(max = 4000, message = "Review notes must be at most 4000 characters"))]
    pub review_notes: String,
}

impl VerificationRequest {
    /// Pending is the only state a decision can be taken from.
    pub fn decide(&self, decision: VerificationDecision) -> Result<VerificationStatus, AppError> {
        if self.status != VerificationStatus::Pending {
            return Err(AppError::InvalidTransition(format!(
                "Verification request is already {}",
                self.status.as_str()
            )));
        }
        Ok(match decision {
            VerificationDecision::Approve => VerificationStatus::Approved,
            VerificationDecision::Reject => VerificationStatus::Rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: VerificationStatus) -> VerificationRequest {
        let now = Utc::now();
        VerificationRequest {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            request_type: VerificationLevel::Audited,
            status,
            assigned_to: None,
            review_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn pending_requests_can_be_decided() {
        let pending = request(VerificationStatus::Pending);
        assert_eq!(
            pending.decide(VerificationDecision::Approve).unwrap(),
            VerificationStatus::Approved
        );
        assert_eq!(
            pending.decide(VerificationDecision::Reject).unwrap(),
            VerificationStatus::Rejected
        );
    }

    #[test]
    fn decided_requests_are_final() {
        let err = request(VerificationStatus::Rejected)
            .decide(VerificationDecision::Approve)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert!(err.to_string().contains("rejected"));
    }

    #[test]
    fn decision_wire_format() {
        let body: ProcessVerificationRequest =
            serde_json::from_str(r#"{"decision":"approve"}"#).unwrap();
        assert_eq!(body.decision, VerificationDecision::Approve);
        assert!(body.review_notes.is_empty());
    }
}
