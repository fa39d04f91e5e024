//! Workflow interpreter
//!
//! Steps run in order against a working copy of the organization. A condition
//! that does not hold halts the run; the remaining steps are skipped. Actions
//! accumulate into an [`UpdateOrganizationRequest`] that the caller persists.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    ConditionField, ConditionOperator, Organization, UpdateOrganizationRequest,
    VerificationLevel, Workflow, WorkflowAction, WorkflowStep,
};

pub const MAX_WORKFLOW_STEPS: usize = 50;
const MAX_GRADE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Workflow must have at least one step")]
    NoSteps,

    #[error("Workflow may have at most {} steps", MAX_WORKFLOW_STEPS)]
    TooManySteps,

    #[error("Step {index}: {message}")]
    InvalidStep { index: usize, message: String },

    #[error("Workflow is inactive")]
    Inactive,
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Inactive => AppError::InvalidTransition(err.to_string()),
            other => AppError::InvalidInput(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Completed,
    Halted,
}

/// Execution report for one run of a workflow on one organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub workflow_id: Uuid,
    pub organization_id: Uuid,
    pub outcome: RunOutcome,
    pub steps_executed: usize,
    /// 1-based index of the condition that stopped the run
    pub halted_at: Option<usize>,
    pub log: Vec<String>,
    pub changes: UpdateOrganizationRequest,
}

fn field_name(field: ConditionField) -> &'static str {
    match field {
        ConditionField::ImpactScore => "impact_score",
        ConditionField::ImpactGrade => "impact_grade",
        ConditionField::VerificationLevel => "verification_level",
        ConditionField::Sector => "sector",
        ConditionField::Region => "region",
        ConditionField::EmployeeCount => "employee_count",
        ConditionField::BeneficiaryCount => "beneficiary_count",
        ConditionField::ProgramCount => "program_count",
    }
}

fn operator_symbol(op: ConditionOperator) -> &'static str {
    match op {
        ConditionOperator::Eq => "==",
        ConditionOperator::Ne => "!=",
        ConditionOperator::Gt => ">",
        ConditionOperator::Gte => ">=",
        ConditionOperator::Lt => "<",
        ConditionOperator::Lte => "<=",
        ConditionOperator::Contains => "contains",
    }
}

fn check_condition(
    field: ConditionField,
    operator: ConditionOperator,
    value: &serde_json::Value,
) -> Result<(), String> {
    let name = field_name(field);
    if field.is_numeric() {
        if operator == ConditionOperator::Contains {
            return Err(format!("'contains' is not supported for {name}"));
        }
        if value.as_f64().is_none() {
            return Err(format!("{name} must be compared with a number"));
        }
        return Ok(());
    }
    let text = value
        .as_str()
        .ok_or_else(|| format!("{name} must be compared with a string"))?;
    match field {
        ConditionField::VerificationLevel => {
            if operator == ConditionOperator::Contains {
                return Err(format!("'contains' is not supported for {name}"));
            }
            if VerificationLevel::parse_loose(text).is_none() {
                return Err(format!("unknown verification level '{text}'"));
            }
        }
        _ if operator.is_ordering() => {
            return Err(format!("'{}' is not supported for {name}", operator_symbol(operator)));
        }
        _ => {}
    }
    Ok(())
}

fn check_action(action: &WorkflowAction) -> Result<(), String> {
    match action {
        WorkflowAction::SetVerificationLevel { .. } => Ok(()),
        WorkflowAction::SetImpactGrade { grade } => {
            let grade = grade.trim();
            if grade.is_empty() {
                Err("impact grade cannot be empty".to_string())
            } else if grade.len() > MAX_GRADE_LEN {
                Err(format!("impact grade must be at most {MAX_GRADE_LEN} characters"))
            } else {
                Ok(())
            }
        }
        WorkflowAction::Note { message } => {
            if message.trim().is_empty() {
                Err("note message cannot be empty".to_string())
            } else {
                Ok(())
            }
        }
    }
}

/// Type-check a step list before it is stored or run.
pub fn validate_steps(steps: &[WorkflowStep]) -> Result<(), WorkflowError> {
    if steps.is_empty() {
        return Err(WorkflowError::NoSteps);
    }
    if steps.len() > MAX_WORKFLOW_STEPS {
        return Err(WorkflowError::TooManySteps);
    }
    for (i, step) in steps.iter().enumerate() {
        let result = match step {
            WorkflowStep::Condition {
                field,
                operator,
                value,
            } => check_condition(*field, *operator, value),
            WorkflowStep::Action { action } => check_action(action),
        };
        result.map_err(|message| WorkflowError::InvalidStep {
            index: i + 1,
            message,
        })?;
    }
    Ok(())
}

fn compare_ordering(ordering: Ordering, operator: ConditionOperator) -> bool {
    match operator {
        ConditionOperator::Eq => ordering == Ordering::Equal,
        ConditionOperator::Ne => ordering != Ordering::Equal,
        ConditionOperator::Gt => ordering == Ordering::Greater,
        ConditionOperator::Gte => ordering != Ordering::Less,
        ConditionOperator::Lt => ordering == Ordering::Less,
        ConditionOperator::Lte => ordering != Ordering::Greater,
        ConditionOperator::Contains => false,
    }
}

fn evaluate(
    org: &Organization,
    field: ConditionField,
    operator: ConditionOperator,
    value: &serde_json::Value,
) -> bool {
    let numeric = match field {
        ConditionField::ImpactScore => Some(f64::from(org.impact_score)),
        ConditionField::EmployeeCount => Some(f64::from(org.employee_count)),
        ConditionField::ProgramCount => Some(f64::from(org.program_count)),
        ConditionField::BeneficiaryCount => Some(org.beneficiary_count as f64),
        _ => None,
    };
    if let Some(actual) = numeric {
        return value
            .as_f64()
            .and_then(|expected| actual.partial_cmp(&expected))
            .is_some_and(|ordering| compare_ordering(ordering, operator));
    }

    let expected = value.as_str().unwrap_or_default();
    if field == ConditionField::VerificationLevel {
        return VerificationLevel::parse_loose(expected).is_some_and(|level| {
            compare_ordering(org.verification_level.cmp(&level), operator)
        });
    }

    let actual = match field {
        ConditionField::Sector => &org.sector,
        ConditionField::Region => &org.region,
        _ => &org.impact_grade,
    };
    let actual = actual.to_lowercase();
    let expected = expected.to_lowercase();
    match operator {
        ConditionOperator::Eq => actual == expected,
        ConditionOperator::Ne => actual != expected,
        ConditionOperator::Contains => actual.contains(&expected),
        _ => false,
    }
}

/// Run `workflow` against `org` without side effects.
///
/// The returned report carries the accumulated changes; persisting them is the
/// caller's concern.
pub fn run_workflow(workflow: &Workflow, org: &Organization) -> Result<WorkflowRun, WorkflowError> {
    if !workflow.active {
        return Err(WorkflowError::Inactive);
    }
    validate_steps(&workflow.steps)?;

    let mut working = org.clone();
    let mut changes = UpdateOrganizationRequest::default();
    let mut log = Vec::new();
    let mut steps_executed = 0;

    for (i, step) in workflow.steps.iter().enumerate() {
        let index = i + 1;
        steps_executed += 1;
        match step {
            WorkflowStep::Condition {
                field,
                operator,
                value,
            } => {
                let held = evaluate(&working, *field, *operator, value);
                let description = format!(
                    "{} {} {}",
                    field_name(*field),
                    operator_symbol(*operator),
                    value
                );
                if !held {
                    log.push(format!("Step {index}: condition {description} not met, halting"));
                    return Ok(WorkflowRun {
                        workflow_id: workflow.id,
                        organization_id: org.id,
                        outcome: RunOutcome::Halted,
                        steps_executed,
                        halted_at: Some(index),
                        log,
                        changes,
                    });
                }
                log.push(format!("Step {index}: condition {description} met"));
            }
            WorkflowStep::Action { action } => match action {
                WorkflowAction::SetVerificationLevel { level } => {
                    working.verification_level = *level;
                    changes.verification_level = Some(*level);
                    log.push(format!("Step {index}: verification level set to {level}"));
                }
                WorkflowAction::SetImpactGrade { grade } => {
                    let grade = grade.trim().to_string();
                    log.push(format!("Step {index}: impact grade set to {grade}"));
                    working.impact_grade = grade.clone();
                    changes.impact_grade = Some(grade);
                }
                WorkflowAction::Note { message } => {
                    log.push(format!("Step {index}: {message}"));
                }
            },
        }
    }

    Ok(WorkflowRun {
        workflow_id: workflow.id,
        organization_id: org.id,
        outcome: RunOutcome::Completed,
        steps_executed,
        halted_at: None,
        log,
        changes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn organization() -> Organization {
        let now = Utc::now();
        Organization {
            id: Uuid::new_v4(),
            name: "Clean Water Collective".to_string(),
            sector: "Environment".to_string(),
            region: "BC".to_string(),
            website: String::new(),
            contact_info: String::new(),
            contact_email: String::new(),
            mission: String::new(),
            description: String::new(),
            impact_score: 85,
            impact_grade: "A".to_string(),
            verification_level: VerificationLevel::SelfReported,
            founding_year: 2010,
            employee_count: 12,
            program_count: 2,
            beneficiary_count: 4500,
            annual_budget: 0,
            summary: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn workflow(steps: serde_json::Value) -> Workflow {
        let now = Utc::now();
        Workflow {
            id: Uuid::new_v4(),
            name: "Promote high scorers".to_string(),
            description: String::new(),
            steps: serde_json::from_value(steps).unwrap(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn conditions_gate_actions() {
        let wf = workflow(json!([
            {"type": "condition", "field": "impact_score", "operator": "gte", "value": 80},
            {"type": "condition", "field": "sector", "operator": "eq", "value": "environment"},
            {"type": "action", "action": {"kind": "set_verification_level", "level": "verified"}},
            {"type": "action", "action": {"kind": "note", "message": "auto-promoted"}}
        ]));
        let run = run_workflow(&wf, &organization()).unwrap();
        assert_eq!(run.outcome, RunOutcome::Completed);
        assert_eq!(run.steps_executed, 4);
        assert_eq!(
            run.changes.verification_level,
            Some(VerificationLevel::Verified)
        );
        assert_eq!(run.log.len(), 4);
        assert!(run.log[3].contains("auto-promoted"));
    }

    #[test]
    fn false_condition_halts_run() {
        let wf = workflow(json!([
            {"type": "action", "action": {"kind": "set_impact_grade", "grade": "B"}},
            {"type": "condition", "field": "beneficiary_count", "operator": "gt", "value": 10000},
            {"type": "action", "action": {"kind": "set_verification_level", "level": "audited"}}
        ]));
        let run = run_workflow(&wf, &organization()).unwrap();
        assert_eq!(run.outcome, RunOutcome::Halted);
        assert_eq!(run.halted_at, Some(2));
        assert_eq!(run.steps_executed, 2);
        assert_eq!(run.changes.impact_grade.as_deref(), Some("B"));
        assert!(run.changes.verification_level.is_none());
    }

    #[test]
    fn later_conditions_see_earlier_actions() {
        let wf = workflow(json!([
            {"type": "action", "action": {"kind": "set_verification_level", "level": "verified"}},
            {"type": "condition", "field": "verification_level", "operator": "gte", "value": "verified"},
            {"type": "action", "action": {"kind": "set_impact_grade", "grade": "A+"}}
        ]));
        let run = run_workflow(&wf, &organization()).unwrap();
        assert_eq!(run.outcome, RunOutcome::Completed);
        assert_eq!(run.changes.impact_grade.as_deref(), Some("A+"));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let wf = workflow(json!([
            {"type": "condition", "field": "sector", "operator": "contains", "value": "ENVIRON"},
            {"type": "action", "action": {"kind": "note", "message": "matched"}}
        ]));
        let run = run_workflow(&wf, &organization()).unwrap();
        assert_eq!(run.outcome, RunOutcome::Completed);
    }

    #[test]
    fn inactive_workflow_refused() {
        let mut wf = workflow(json!([
            {"type": "action", "action": {"kind": "note", "message": "hi"}}
        ]));
        wf.active = false;
        assert_eq!(
            run_workflow(&wf, &organization()).unwrap_err(),
            WorkflowError::Inactive
        );
    }

    #[test]
    fn validation_rejects_ill_typed_steps() {
        assert_eq!(validate_steps(&[]), Err(WorkflowError::NoSteps));

        let steps: Vec<WorkflowStep> = serde_json::from_value(json!([
            {"type": "action", "action": {"kind": "note", "message": "ok"}},
            {"type": "condition", "field": "impact_score", "operator": "gt", "value": "high"}
        ]))
        .unwrap();
        match validate_steps(&steps) {
            Err(WorkflowError::InvalidStep { index, message }) => {
                assert_eq!(index, 2);
                assert!(message.contains("number"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        let steps: Vec<WorkflowStep> = serde_json::from_value(json!([
            {"type": "condition", "field": "region", "operator": "lt", "value": "ON"}
        ]))
        .unwrap();
        assert!(validate_steps(&steps).is_err());

        let steps: Vec<WorkflowStep> = serde_json::from_value(json!([
            {"type": "condition", "field": "verification_level", "operator": "eq", "value": "gold"}
        ]))
        .unwrap();
        assert!(validate_steps(&steps).is_err());

        let too_many: Vec<WorkflowStep> = (0..=MAX_WORKFLOW_STEPS)
            .map(|_| WorkflowStep::Action {
                action: WorkflowAction::Note {
                    message: "x".to_string(),
                },
            })
            .collect();
        assert_eq!(validate_steps(&too_many), Err(WorkflowError::TooManySteps));
    }

    #[test]
    fn errors_map_to_app_errors() {
        assert!(matches!(
            AppError::from(WorkflowError::Inactive),
            AppError::InvalidTransition(_)
        ));
        assert!(matches!(
            AppError::from(WorkflowError::NoSteps),
            AppError::InvalidInput(_)
        ));
    }
}
