//! Programs, metrics and partners. Each row belongs to exactly one organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Default status for programs that do not state one
pub const DEFAULT_PROGRAM_STATUS: &str = "active";

/// Program run by an organization (database row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Program {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub description: String,
    pub metrics: String,
    pub beneficiaries: String,
    pub people_reached: i64,
    pub start_year: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Program as submitted with an organization or on its own
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct NewProgram {
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub name: String,
    pub description: String,
    pub metrics: String,
    pub beneficiaries: String,
    #[validate(range(min = 0, message = "People reached cannot be negative"))]
    pub people_reached: i64,
    pub start_year: i32,
    pub status: String,
}

/// Metric attached to an organization at ingestion time (database row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub value: String,
    pub unit: String,
    pub year: i32,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct NewMetric {
    pub name: String,
    pub value: String,
    pub unit: String,
    pub year: i32,
    pub category: String,
}

/// Partner of an organization (database row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct NewPartner {
    pub name: String,
    pub role: String,
}

impl NewProgram {
    pub fn into_program(self, organization_id: Uuid, created_at: DateTime<Utc>) -> Program {
        Program {
            id: Uuid::new_v4(),
            organization_id,
            name: self.name,
            description: self.description,
            metrics: self.metrics,
            beneficiaries: self.beneficiaries,
            people_reached: self.people_reached,
            start_year: self.start_year,
            status: if self.status.trim().is_empty() {
                DEFAULT_PROGRAM_STATUS.to_string()
            } else {
                self.status
            },
            created_at,
        }
    }
}

impl NewMetric {
    pub fn into_metric(self, organization_id: Uuid) -> Metric {
        Metric {
            id: Uuid::new_v4(),
            organization_id,
            name: self.name,
            value: self.value,
            unit: self.unit,
            year: self.year,
            category: self.category,
        }
    }
}

impl NewPartner {
    pub fn into_partner(self, organization_id: Uuid) -> Partner {
        Partner {
            id: Uuid::new_v4(),
            organization_id,
            name: self.name,
            role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_program_defaults_status() {
        let org_id = Uuid::new_v4();
        let program = NewProgram {
            name: "Reading Circles".to_string(),
            ..Default::default()
        }
        .into_program(org_id, Utc::now());
        assert_eq!(program.organization_id, org_id);
        assert_eq!(program.status, DEFAULT_PROGRAM_STATUS);
    }

    #[test]
    fn new_program_validation() {
        let program = NewProgram {
            name: " ".to_string(),
            people_reached: -4,
            ..Default::default()
        };
        let errors = program.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("people_reached"));
    }
}
