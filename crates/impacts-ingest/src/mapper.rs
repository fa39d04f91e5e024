//! Field mapping from loose, AI-generated organization records.
//!
//! Input is first lifted into [`UntrustedOrganization`], where every field is
//! optional and read by its own extraction function. Each function lists the
//! keys it accepts, so aliases and nested locations are enumerated in one place.
//! [`map_organization`] then applies the defaults and produces the canonical
//! [`CreateOrganizationRequest`].
//!
//! Mapping never fails on missing or mistyped fields. Only a top level that is
//! not an object is an error.

use impacts_core::models::{
    CreateOrganizationRequest, NewMetric, NewPartner, NewProgram, VerificationLevel,
    DEFAULT_PROGRAM_STATUS,
};
use serde_json::{Map, Value};

use crate::error::IngestError;

/// Grade shown when the input carries none
pub const UNKNOWN_GRADE: &str = "N/A";
/// Metric placeholders for key statistics awaiting manual correction
pub const PLACEHOLDER_METRIC_VALUE: &str = "0";
pub const PLACEHOLDER_METRIC_UNIT: &str = "TBD";
pub const KEY_STATISTIC_CATEGORY: &str = "key_statistic";

/// Organization record as received. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UntrustedOrganization {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub website: Option<String>,
    pub contact_name: Option<String>,
    pub contact_role: Option<String>,
    pub contact_email: Option<String>,
    /// Pre-formatted contact line, used when no contact parts are present
    pub contact_info: Option<String>,
    pub mission: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub impact_score: Option<i64>,
    pub impact_grade: Option<String>,
    pub verification_level: Option<VerificationLevel>,
    pub founding_year: Option<i64>,
    pub employee_count: Option<i64>,
    pub beneficiary_count: Option<i64>,
    pub annual_budget: Option<i64>,
    pub programs: Vec<UntrustedProgram>,
    pub key_statistics: Vec<String>,
    pub metrics: Vec<UntrustedMetric>,
    pub partners: Vec<UntrustedPartner>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UntrustedProgram {
    pub name: Option<String>,
    pub description: Option<String>,
    pub metrics: Option<String>,
    pub beneficiaries: Option<String>,
    pub people_reached: Option<i64>,
    pub start_year: Option<i64>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UntrustedMetric {
    pub name: Option<String>,
    pub value: Option<String>,
    pub unit: Option<String>,
    pub year: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UntrustedPartner {
    pub name: Option<String>,
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Lookup helpers
// ---------------------------------------------------------------------------

/// Resolve a dotted path ("best_contact.email") inside an object.
fn lookup<'a>(obj: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = obj.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// First non-empty string at any of `paths`. Numbers and booleans are stringified.
fn text(obj: &Map<String, Value>, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match lookup(obj, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Lenient integer: `42`, `42.6`, `"42"`, `"1,200"`, `"$3,500,000"`, `"85%"`.
fn parse_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| !matches!(c, ',' | '$' | '%' | ' ' | '_'))
                .collect();
            cleaned
                .parse::<i64>()
                .ok()
                .or_else(|| cleaned.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

fn number(obj: &Map<String, Value>, paths: &[&str]) -> Option<i64> {
    paths
        .iter()
        .find_map(|path| lookup(obj, path).and_then(parse_number))
}

/// Text field that may also arrive as an array of strings; arrays join with "; ".
fn text_or_list(obj: &Map<String, Value>, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match lookup(obj, path)? {
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        _ => text(obj, &[*path]),
    })
}

fn objects<'a>(obj: &'a Map<String, Value>, paths: &[&str]) -> Vec<&'a Map<String, Value>> {
    paths
        .iter()
        .find_map(|path| lookup(obj, path)?.as_array())
        .map(|items| items.iter().filter_map(Value::as_object).collect())
        .unwrap_or_default()
}

fn strings(obj: &Map<String, Value>, paths: &[&str]) -> Vec<String> {
    paths
        .iter()
        .find_map(|path| lookup(obj, path)?.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Per-field extraction
// ---------------------------------------------------------------------------

fn extract_name(obj: &Map<String, Value>) -> Option<String> {
    text(obj, &["name", "organization_name", "organizationName", "org_name"])
}

fn extract_sector(obj: &Map<String, Value>) -> Option<String> {
    text(obj, &["sector", "cause_area", "category"])
}

fn extract_region(obj: &Map<String, Value>) -> Option<String> {
    text(
        obj,
        &["region", "province", "location.region", "location.province", "headquarters"],
    )
}

fn extract_website(obj: &Map<String, Value>) -> Option<String> {
    text(obj, &["website", "website_url", "url", "contact.website"])
}

fn extract_contact_name(obj: &Map<String, Value>) -> Option<String> {
    text(obj, &["best_contact.name", "contact.name", "contact_name"])
}

fn extract_contact_role(obj: &Map<String, Value>) -> Option<String> {
    text(
        obj,
        &["best_contact.role", "best_contact.title", "contact.role", "contact_role"],
    )
}

fn extract_contact_email(obj: &Map<String, Value>) -> Option<String> {
    text(
        obj,
        &[
            "best_contact.email",
            "contact.email",
            "contact_email",
            "contactEmail",
            "email",
        ],
    )
}

fn extract_contact_info(obj: &Map<String, Value>) -> Option<String> {
    text(obj, &["contact_info", "contactInfo"])
}

fn extract_mission(obj: &Map<String, Value>) -> Option<String> {
    text(obj, &["mission", "mission_statement", "missionStatement"])
}

fn extract_description(obj: &Map<String, Value>) -> Option<String> {
    text(obj, &["description", "about", "overview"])
}

fn extract_summary(obj: &Map<String, Value>) -> Option<String> {
    text(
        obj,
        &["impact_analysis.executive_summary", "executive_summary", "summary"],
    )
}

fn extract_impact_score(obj: &Map<String, Value>) -> Option<i64> {
    number(
        obj,
        &[
            "impact_score",
            "impactScore",
            "impact_analysis.impact_score",
            "impact_analysis.score",
        ],
    )
}

fn extract_impact_grade(obj: &Map<String, Value>) -> Option<String> {
    text(
        obj,
        &[
            "impact_grade",
            "impactGrade",
            "impact_analysis.impact_grade",
            "impact_analysis.grade",
        ],
    )
}

fn extract_verification_level(obj: &Map<String, Value>) -> Option<VerificationLevel> {
    text(obj, &["verification_level", "verificationLevel"])
        .and_then(|level| VerificationLevel::parse_loose(&level))
}

fn extract_founding_year(obj: &Map<String, Value>) -> Option<i64> {
    number(
        obj,
        &["founding_year", "foundingYear", "year_founded", "founded"],
    )
}

fn extract_employee_count(obj: &Map<String, Value>) -> Option<i64> {
    number(
        obj,
        &[
            "employee_count",
            "employeeCount",
            "employees",
            "staff_count",
            "financials.employee_count",
        ],
    )
}

fn extract_beneficiary_count(obj: &Map<String, Value>) -> Option<i64> {
    number(
        obj,
        &[
            "beneficiary_count",
            "beneficiaryCount",
            "impact_analysis.beneficiary_count",
        ],
    )
}

fn extract_annual_budget(obj: &Map<String, Value>) -> Option<i64> {
    number(
        obj,
        &[
            "financials.annual_budget",
            "financials.budget",
            "financials.annual_revenue",
            "financials.revenue",
            "annual_budget",
            "annualBudget",
        ],
    )
}

fn extract_key_statistics(obj: &Map<String, Value>) -> Vec<String> {
    strings(
        obj,
        &["key_statistics", "impact_analysis.key_statistics", "keyStatistics"],
    )
}

fn extract_program(obj: &Map<String, Value>) -> UntrustedProgram {
    UntrustedProgram {
        name: text(obj, &["name", "program_name", "title"]),
        description: text(obj, &["description", "summary"]),
        metrics: text_or_list(obj, &["metrics", "key_metrics", "outcomes"]),
        beneficiaries: text(obj, &["beneficiaries", "target_beneficiaries", "target_population"]),
        people_reached: number(
            obj,
            &["people_reached", "peopleReached", "beneficiaries_reached", "reach"],
        ),
        start_year: number(obj, &["start_year", "startYear", "year_started"]),
        status: text(obj, &["status"]),
    }
}

fn extract_metric(obj: &Map<String, Value>) -> UntrustedMetric {
    UntrustedMetric {
        name: text(obj, &["name", "metric", "label"]),
        value: text(obj, &["value"]),
        unit: text(obj, &["unit"]),
        year: number(obj, &["year"]),
        category: text(obj, &["category"]),
    }
}

fn extract_partner(obj: &Map<String, Value>) -> UntrustedPartner {
    UntrustedPartner {
        name: text(obj, &["name", "partner_name"]),
        role: text(obj, &["role", "relationship", "type"]),
    }
}

impl UntrustedOrganization {
    /// Lift a parsed JSON value. Fails only when the top level is not an object.
    pub fn from_value(value: &Value) -> Result<Self, IngestError> {
        let obj = value.as_object().ok_or(IngestError::NotAnObject)?;
        Ok(Self {
            name: extract_name(obj),
            sector: extract_sector(obj),
            region: extract_region(obj),
            website: extract_website(obj),
            contact_name: extract_contact_name(obj),
            contact_role: extract_contact_role(obj),
            contact_email: extract_contact_email(obj),
            contact_info: extract_contact_info(obj),
            mission: extract_mission(obj),
            description: extract_description(obj),
            summary: extract_summary(obj),
            impact_score: extract_impact_score(obj),
            impact_grade: extract_impact_grade(obj),
            verification_level: extract_verification_level(obj),
            founding_year: extract_founding_year(obj),
            employee_count: extract_employee_count(obj),
            beneficiary_count: extract_beneficiary_count(obj),
            annual_budget: extract_annual_budget(obj),
            programs: objects(obj, &["programs", "key_programs"])
                .into_iter()
                .map(extract_program)
                .collect(),
            key_statistics: extract_key_statistics(obj),
            metrics: objects(obj, &["metrics"])
                .into_iter()
                .map(extract_metric)
                .collect(),
            partners: objects(obj, &["partners", "key_partners"])
                .into_iter()
                .map(extract_partner)
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

fn to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn year_or(value: Option<i64>, current_year: i32) -> i32 {
    value.map(to_i32).unwrap_or(current_year)
}

/// "Name (Role)" when both are present, otherwise whichever exists.
fn contact_display(input: &UntrustedOrganization) -> String {
    match (&input.contact_name, &input.contact_role) {
        (Some(name), Some(role)) => format!("{name} ({role})"),
        (Some(name), None) => name.clone(),
        (None, Some(role)) => role.clone(),
        (None, None) => input.contact_info.clone().unwrap_or_default(),
    }
}

fn map_program(program: &UntrustedProgram, current_year: i32) -> NewProgram {
    NewProgram {
        name: program.name.clone().unwrap_or_default(),
        description: program.description.clone().unwrap_or_default(),
        metrics: program.metrics.clone().unwrap_or_default(),
        beneficiaries: program.beneficiaries.clone().unwrap_or_default(),
        people_reached: program.people_reached.unwrap_or(0).max(0),
        start_year: year_or(program.start_year, current_year),
        status: program
            .status
            .clone()
            .unwrap_or_else(|| DEFAULT_PROGRAM_STATUS.to_string()),
    }
}

/// Map an untrusted record onto the canonical shape.
///
/// Pure: the same input and `current_year` always give the same output.
/// `current_year` fills every missing year and is the only input not taken
/// from the record.
pub fn map_organization(
    input: &UntrustedOrganization,
    current_year: i32,
) -> CreateOrganizationRequest {
    let programs: Vec<NewProgram> = input
        .programs
        .iter()
        .map(|p| map_program(p, current_year))
        .collect();

    let reached = programs
        .iter()
        .map(|p| p.people_reached)
        .fold(0i64, i64::saturating_add);
    let beneficiary_count = if programs.is_empty() {
        input.beneficiary_count.unwrap_or(0)
    } else {
        reached
    };

    let mut metrics: Vec<NewMetric> = input
        .metrics
        .iter()
        .map(|m| NewMetric {
            name: m.name.clone().unwrap_or_default(),
            value: m
                .value
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_METRIC_VALUE.to_string()),
            unit: m
                .unit
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_METRIC_UNIT.to_string()),
            year: year_or(m.year, current_year),
            category: m.category.clone().unwrap_or_default(),
        })
        .collect();
    metrics.extend(input.key_statistics.iter().map(|stat| NewMetric {
        name: stat.clone(),
        value: PLACEHOLDER_METRIC_VALUE.to_string(),
        unit: PLACEHOLDER_METRIC_UNIT.to_string(),
        year: current_year,
        category: KEY_STATISTIC_CATEGORY.to_string(),
    }));

    let partners = input
        .partners
        .iter()
        .filter(|p| p.name.is_some())
        .map(|p| NewPartner {
            name: p.name.clone().unwrap_or_default(),
            role: p.role.clone().unwrap_or_default(),
        })
        .collect();

    CreateOrganizationRequest {
        name: input.name.clone().unwrap_or_default(),
        sector: input.sector.clone().unwrap_or_default(),
        region: input.region.clone().unwrap_or_default(),
        website: input.website.clone().unwrap_or_default(),
        contact_info: contact_display(input),
        contact_email: input.contact_email.clone().unwrap_or_default(),
        mission: input.mission.clone().unwrap_or_default(),
        description: input.description.clone().unwrap_or_default(),
        impact_score: input.impact_score.map(to_i32).unwrap_or(0),
        impact_grade: input
            .impact_grade
            .clone()
            .unwrap_or_else(|| UNKNOWN_GRADE.to_string()),
        verification_level: input.verification_level.unwrap_or_default(),
        founding_year: year_or(input.founding_year, current_year),
        employee_count: input.employee_count.map(to_i32).unwrap_or(0),
        program_count: to_i32(programs.len() as i64),
        beneficiary_count,
        annual_budget: input.annual_budget.unwrap_or(0),
        summary: input.summary.clone().unwrap_or_default(),
        programs,
        metrics,
        partners,
    }
}

/// Lift and map in one step.
pub fn map_value(value: &Value, current_year: i32) -> Result<CreateOrganizationRequest, IngestError> {
    let input = UntrustedOrganization::from_value(value)?;
    Ok(map_organization(&input, current_year))
}
