use impacts_core::models::{CreateOrganizationRequest, VerificationLevel};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Editable view of a candidate.
///
/// Exposes the scalar organization fields only; programs, metrics and
/// partners are not editable here and pass through a save untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct OrganizationForm {
    #[validate(length(min = 1, max = 255, message = "Name is required (at most 255 characters)"))]
    pub name: String,
    #[validate(length(min = 1, message = "Sector is required"))]
    pub sector: String,
    #[validate(length(min = 1, message = "Region is required"))]
    pub region: String,
    #[validate(custom(function = "impacts_core::validation::optional_url"))]
    pub website: String,
    pub contact_info: String,
    #[validate(custom(function = "impacts_core::validation::optional_email"))]
    pub contact_email: String,
    pub mission: String,
    pub description: String,
    #[validate(range(min = 0, max = 100, message = "Impact score must be between 0 and 100"))]
    pub impact_score: i32,
    pub impact_grade: String,
    pub verification_level: VerificationLevel,
    #[validate(range(min = 1800, max = 2100, message = "Founding year must be between 1800 and 2100"))]
    pub founding_year: i32,
    #[validate(range(min = 0, message = "Employee count cannot be negative"))]
    pub employee_count: i32,
    pub summary: String,
}

impl OrganizationForm {
    pub fn from_candidate(candidate: &CreateOrganizationRequest) -> Self {
        Self {
            name: candidate.name.clone(),
            sector: candidate.sector.clone(),
            region: candidate.region.clone(),
            website: candidate.website.clone(),
            contact_info: candidate.contact_info.clone(),
            contact_email: candidate.contact_email.clone(),
            mission: candidate.mission.clone(),
            description: candidate.description.clone(),
            impact_score: candidate.impact_score,
            impact_grade: candidate.impact_grade.clone(),
            verification_level: candidate.verification_level,
            founding_year: candidate.founding_year,
            employee_count: candidate.employee_count,
            summary: candidate.summary.clone(),
        }
    }

    /// Trim text fields so whitespace-only values count as missing.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.sector,
            &mut self.region,
            &mut self.website,
            &mut self.contact_email,
            &mut self.impact_grade,
        ] {
            *field = field.trim().to_string();
        }
        self
    }

    /// Write the form's fields into `candidate`. Collections are left alone.
    pub fn merge_into(self, candidate: &mut CreateOrganizationRequest) {
        candidate.name = self.name;
        candidate.sector = self.sector;
        candidate.region = self.region;
        candidate.website = self.website;
        candidate.contact_info = self.contact_info;
        candidate.contact_email = self.contact_email;
        candidate.mission = self.mission;
        candidate.description = self.description;
        candidate.impact_score = self.impact_score;
        candidate.impact_grade = self.impact_grade;
        candidate.verification_level = self.verification_level;
        candidate.founding_year = self.founding_year;
        candidate.employee_count = self.employee_count;
        candidate.summary = self.summary;
    }

    /// Apply a single `field=value` edit given in camelCase or snake_case.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), String> {
        let parse_int = |value: &str| {
            value
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("{field} expects a whole number, got '{value}'"))
        };
        match field {
            "name" => self.name = value.to_string(),
            "sector" => self.sector = value.to_string(),
            "region" => self.region = value.to_string(),
            "website" => self.website = value.to_string(),
            "contactInfo" | "contact_info" => self.contact_info = value.to_string(),
            "contactEmail" | "contact_email" => self.contact_email = value.to_string(),
            "mission" => self.mission = value.to_string(),
            "description" => self.description = value.to_string(),
            "summary" => self.summary = value.to_string(),
            "impactGrade" | "impact_grade" => self.impact_grade = value.to_string(),
            "impactScore" | "impact_score" => self.impact_score = parse_int(value)?,
            "foundingYear" | "founding_year" => self.founding_year = parse_int(value)?,
            "employeeCount" | "employee_count" => self.employee_count = parse_int(value)?,
            "verificationLevel" | "verification_level" => {
                self.verification_level = VerificationLevel::parse_loose(value)
                    .ok_or_else(|| format!("unknown verification level '{value}'"))?
            }
            other => return Err(format!("'{other}' is not an editable field")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use impacts_core::models::NewProgram;

    fn candidate() -> CreateOrganizationRequest {
        CreateOrganizationRequest {
            name: "A".to_string(),
            sector: "Education".to_string(),
            region: "ON".to_string(),
            impact_grade: "N/A".to_string(),
            founding_year: 2025,
            programs: vec![NewProgram {
                name: "Tutoring".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn impact_score_above_100_rejected() {
        let mut form = OrganizationForm::from_candidate(&candidate());
        form.impact_score = 150;
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("impact_score"));
    }

    #[test]
    fn required_and_shaped_fields() {
        let mut form = OrganizationForm::from_candidate(&candidate());
        assert!(form.validate().is_ok());

        form.name = "   ".to_string();
        form.website = "not a url".to_string();
        form.contact_email = "nobody".to_string();
        form.founding_year = 1700;
        let errors = form.normalized().validate().unwrap_err();
        let fields = errors.field_errors();
        for key in ["name", "website", "contact_email", "founding_year"] {
            assert!(fields.contains_key(key), "missing error for {key}");
        }
    }

    #[test]
    fn merge_keeps_collections() {
        let mut target = candidate();
        let mut form = OrganizationForm::from_candidate(&target);
        form.name = "Renamed".to_string();
        form.impact_score = 70;
        form.merge_into(&mut target);
        assert_eq!(target.name, "Renamed");
        assert_eq!(target.impact_score, 70);
        assert_eq!(target.programs.len(), 1);
        assert_eq!(target.programs[0].name, "Tutoring");
    }

    #[test]
    fn set_field_accepts_both_spellings() {
        let mut form = OrganizationForm::from_candidate(&candidate());
        form.set_field("impactScore", "88").unwrap();
        form.set_field("verification_level", "audited").unwrap();
        assert_eq!(form.impact_score, 88);
        assert_eq!(form.verification_level, VerificationLevel::Audited);
        assert!(form.set_field("impactScore", "lots").is_err());
        assert!(form.set_field("programs", "[]").is_err());
    }
}
