//! Workflow models for admin automation over organizations
//!
//! A workflow is an ordered list of tagged steps. Conditions gate the run,
//! actions change the organization or annotate the run log. See
//! [`crate::workflow_engine`] for execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::organization::VerificationLevel;

/// Organization attribute a condition reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
    ImpactScore,
    ImpactGrade,
    VerificationLevel,
    Sector,
    Region,
    EmployeeCount,
    BeneficiaryCount,
    ProgramCount,
}

impl ConditionField {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConditionField::ImpactScore
                | ConditionField::EmployeeCount
                | ConditionField::BeneficiaryCount
                | ConditionField::ProgramCount
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
}

impl ConditionOperator {
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ConditionOperator::Gt
                | ConditionOperator::Gte
                | ConditionOperator::Lt
                | ConditionOperator::Lte
        )
    }
}

/// Effect of an action step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowAction {
    SetVerificationLevel { level: VerificationLevel },
    SetImpactGrade { grade: String },
    /// Adds a line to the run log without touching the organization
    Note { message: String },
}

/// Single step in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowStep {
    Condition {
        field: ConditionField,
        operator: ConditionOperator,
        #[schema(value_type = Object)]
        value: serde_json::Value,
    },
    Action { action: WorkflowAction },
}

/// Workflow definition (database row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[cfg_attr(feature = "sqlx", sqlx(json))]
    pub steps: Vec<WorkflowStep>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflowRequest {
    #[validate(
        length(max = 255, message = "Workflow name must be at most 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<WorkflowStep>,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateWorkflowRequest {
    #[validate(
        length(max = 255, message = "Workflow name must be at most 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: Option<String>,
    pub description: Option<String>,
    pub steps: Option<Vec<WorkflowStep>>,
    pub active: Option<bool>,
}

impl UpdateWorkflowRequest {
    pub fn apply_to(self, workflow: &mut Workflow) {
        if let Some(name) = self.name {
            workflow.name = name;
        }
        if let Some(description) = self.description {
            workflow.description = description;
        }
        if let Some(steps) = self.steps {
            workflow.steps = steps;
        }
        if let Some(active) = self.active {
            workflow.active = active;
        }
    }
}
