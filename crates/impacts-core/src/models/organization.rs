use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::program::{Metric, NewMetric, NewPartner, NewProgram, Partner, Program};

/// How an organization's claims were validated (matches database enum)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "verification_level", rename_all = "snake_case")
)]
#[serde(rename_all = "kebab-case")]
pub enum VerificationLevel {
    #[default]
    SelfReported,
    Verified,
    Audited,
}

impl VerificationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationLevel::SelfReported => "self-reported",
            VerificationLevel::Verified => "verified",
            VerificationLevel::Audited => "audited",
        }
    }

    /// Lenient parse used for hand-written or generated input
    /// ("Self Reported", "self_reported", "AUDITED", ...).
    pub fn parse_loose(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();
        match normalized.as_str() {
            "selfreported" | "self" | "unverified" => Some(VerificationLevel::SelfReported),
            "verified" => Some(VerificationLevel::Verified),
            "audited" => Some(VerificationLevel::Audited),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organization (database row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub sector: String,
    pub region: String,
    pub website: String,
    pub contact_info: String,
    pub contact_email: String,
    pub mission: String,
    pub description: String,
    pub impact_score: i32,
    pub impact_grade: String,
    pub verification_level: VerificationLevel,
    pub founding_year: i32,
    pub employee_count: i32,
    pub program_count: i32,
    pub beneficiary_count: i64,
    pub annual_budget: i64,
    pub summary: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organization with its owned programs, metrics and partners
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetail {
    #[serde(flatten)]
    pub organization: Organization,
    pub programs: Vec<Program>,
    pub metrics: Vec<Metric>,
    pub partners: Vec<Partner>,
}

/// Canonical organization shape accepted by `POST /api/organizations`.
///
/// This is also the in-flight candidate produced by the ingestion field mapper.
/// Every field defaults, so a missing `name` surfaces as a validation error
/// rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: String,
    #[validate(
        length(max = 120, message = "Sector must be at most 120 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub sector: String,
    #[validate(
        length(max = 120, message = "Region must be at most 120 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub region: String,
    #[validate(custom(function = "crate::validation::optional_url"))]
    pub website: String,
    pub contact_info: String,
    #[validate(custom(function = "crate::validation::optional_email"))]
    pub contact_email: String,
    pub mission: String,
    pub description: String,
    #[validate(range(min = 0, max = 100, message = "Impact score must be between 0 and 100"))]
    pub impact_score: i32,
    #[validate(length(max = 8, message = "Impact grade must be at most 8 characters"))]
    pub impact_grade: String,
    pub verification_level: VerificationLevel,
    #[validate(range(min = 1800, max = 2100, message = "Founding year must be between 1800 and 2100"))]
    pub founding_year: i32,
    #[validate(range(min = 0, message = "Employee count cannot be negative"))]
    pub employee_count: i32,
    #[validate(range(min = 0, message = "Program count cannot be negative"))]
    pub program_count: i32,
    #[validate(range(min = 0, message = "Beneficiary count cannot be negative"))]
    pub beneficiary_count: i64,
    #[validate(range(min = 0, message = "Annual budget cannot be negative"))]
    pub annual_budget: i64,
    pub summary: String,
    pub programs: Vec<NewProgram>,
    pub metrics: Vec<NewMetric>,
    pub partners: Vec<NewPartner>,
}

/// Response for a created organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatedOrganization {
    pub id: Uuid,
    pub name: String,
}

/// Partial update for an organization. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateOrganizationRequest {
    #[validate(
        length(max = 255, message = "Name must be at most 255 characters"),
        custom(function = "crate::validation::not_blank")
    )]
    pub name: Option<String>,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub sector: Option<String>,
    #[validate(custom(function = "crate::validation::not_blank"))]
    pub region: Option<String>,
    #[validate(custom(function = "crate::validation::optional_url"))]
    pub website: Option<String>,
    pub contact_info: Option<String>,
    #[validate(custom(function = "crate::validation::optional_email"))]
    pub contact_email: Option<String>,
    pub mission: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, max = 100, message = "Impact score must be between 0 and 100"))]
    pub impact_score: Option<i32>,
    #[validate(length(max = 8, message = "Impact grade must be at most 8 characters"))]
    pub impact_grade: Option<String>,
    pub verification_level: Option<VerificationLevel>,
    #[validate(range(min = 1800, max = 2100, message = "Founding year must be between 1800 and 2100"))]
    pub founding_year: Option<i32>,
    #[validate(range(min = 0, message = "Employee count cannot be negative"))]
    pub employee_count: Option<i32>,
    #[validate(range(min = 0, message = "Beneficiary count cannot be negative"))]
    pub beneficiary_count: Option<i64>,
    #[validate(range(min = 0, message = "Annual budget cannot be negative"))]
    pub annual_budget: Option<i64>,
    pub summary: Option<String>,
}

impl UpdateOrganizationRequest {
    pub fn is_empty(&self) -> bool {
        *self == UpdateOrganizationRequest::default()
    }

    /// Apply every present field to `org`. Timestamps are the caller's concern.
    pub fn apply_to(&self, org: &mut Organization) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        set(&mut org.name, &self.name);
        set(&mut org.sector, &self.sector);
        set(&mut org.region, &self.region);
        set(&mut org.website, &self.website);
        set(&mut org.contact_info, &self.contact_info);
        set(&mut org.contact_email, &self.contact_email);
        set(&mut org.mission, &self.mission);
        set(&mut org.description, &self.description);
        set(&mut org.impact_score, &self.impact_score);
        set(&mut org.impact_grade, &self.impact_grade);
        set(&mut org.verification_level, &self.verification_level);
        set(&mut org.founding_year, &self.founding_year);
        set(&mut org.employee_count, &self.employee_count);
        set(&mut org.beneficiary_count, &self.beneficiary_count);
        set(&mut org.annual_budget, &self.annual_budget);
        set(&mut org.summary, &self.summary);
    }
}

/// Filters for listing organizations in the admin back-office
#[derive(Debug, Clone, Default)]
pub struct OrganizationFilter {
    pub sector: Option<String>,
    pub region: Option<String>,
    /// Case-insensitive substring match on the name
    pub search: Option<String>,
    pub verification_level: Option<VerificationLevel>,
    pub limit: i64,
    pub offset: i64,
}

impl OrganizationFilter {
    /// In-process predicate mirroring the SQL WHERE clause.
    pub fn matches(&self, org: &Organization) -> bool {
        let eq = |wanted: &Option<String>, actual: &str| {
            wanted
                .as_deref()
                .map_or(true, |w| w.eq_ignore_ascii_case(actual))
        };
        eq(&self.sector, &org.sector)
            && eq(&self.region, &org.region)
            && self
                .verification_level
                .map_or(true, |level| level == org.verification_level)
            && self.search.as_deref().map_or(true, |needle| {
                org.name.to_lowercase().contains(&needle.to_lowercase())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_level_wire_format() {
        let json = serde_json::to_string(&VerificationLevel::SelfReported).unwrap();
        assert_eq!(json, "\"self-reported\"");
        let parsed: VerificationLevel = serde_json::from_str("\"audited\"").unwrap();
        assert_eq!(parsed, VerificationLevel::Audited);
    }

    #[test]
    fn verification_level_loose_parse() {
        assert_eq!(
            VerificationLevel::parse_loose("Self Reported"),
            Some(VerificationLevel::SelfReported)
        );
        assert_eq!(
            VerificationLevel::parse_loose("self_reported"),
            Some(VerificationLevel::SelfReported)
        );
        assert_eq!(
            VerificationLevel::parse_loose(" VERIFIED "),
            Some(VerificationLevel::Verified)
        );
        assert_eq!(VerificationLevel::parse_loose("gold"), None);
        assert!(VerificationLevel::Audited > VerificationLevel::Verified);
    }

    fn valid_request() -> CreateOrganizationRequest {
        CreateOrganizationRequest {
            name: "Literacy First".to_string(),
            sector: "Education".to_string(),
            region: "ON".to_string(),
            founding_year: 2004,
            ..Default::default()
        }
    }

    #[test]
    fn create_request_validation() {
        assert!(valid_request().validate().is_ok());

        let mut req = valid_request();
        req.impact_score = 150;
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("impact_score"));

        let mut req = valid_request();
        req.website = "example".to_string();
        req.contact_email = "nobody".to_string();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("website"));
        assert!(errors.field_errors().contains_key("contact_email"));

        let mut req = valid_request();
        req.sector = "  ".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_defaults_missing_fields() {
        let req: CreateOrganizationRequest =
            serde_json::from_str(r#"{"name":"A","sector":"Education","region":"ON"}"#).unwrap();
        assert_eq!(req.name, "A");
        assert_eq!(req.impact_score, 0);
        assert!(req.programs.is_empty());
        assert_eq!(req.verification_level, VerificationLevel::SelfReported);
    }

    #[test]
    fn update_request_applies_present_fields_only() {
        let now = Utc::now();
        let mut org = Organization {
            id: Uuid::new_v4(),
            name: "Old".to_string(),
            sector: "Health".to_string(),
            region: "BC".to_string(),
            website: String::new(),
            contact_info: String::new(),
            contact_email: String::new(),
            mission: String::new(),
            description: String::new(),
            impact_score: 40,
            impact_grade: "C".to_string(),
            verification_level: VerificationLevel::SelfReported,
            founding_year: 1999,
            employee_count: 3,
            program_count: 0,
            beneficiary_count: 0,
            annual_budget: 0,
            summary: String::new(),
            created_at: now,
            updated_at: now,
        };
        let update = UpdateOrganizationRequest {
            name: Some("New".to_string()),
            impact_score: Some(80),
            ..Default::default()
        };
        assert!(!update.is_empty());
        update.apply_to(&mut org);
        assert_eq!(org.name, "New");
        assert_eq!(org.impact_score, 80);
        assert_eq!(org.sector, "Health");
        assert_eq!(org.impact_grade, "C");
    }

    #[test]
    fn filter_matches_case_insensitively() {
        let filter = OrganizationFilter {
            sector: Some("education".to_string()),
            search: Some("lit".to_string()),
            ..Default::default()
        };
        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4(),
            name: "Literacy First".to_string(),
            sector: "Education".to_string(),
            region: "ON".to_string(),
            website: String::new(),
            contact_info: String::new(),
            contact_email: String::new(),
            mission: String::new(),
            description: String::new(),
            impact_score: 0,
            impact_grade: "N/A".to_string(),
            verification_level: VerificationLevel::SelfReported,
            founding_year: 2000,
            employee_count: 0,
            program_count: 0,
            beneficiary_count: 0,
            annual_budget: 0,
            summary: String::new(),
            created_at: now,
            updated_at: now,
        };
        assert!(filter.matches(&org));
        let filter = OrganizationFilter {
            region: Some("QC".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&org));
    }
}
