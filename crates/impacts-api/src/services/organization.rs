//! Organization service: creation (single and batch), admin edits, programs.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use impacts_core::models::{
    BatchImportReport, CreateOrganizationRequest, CreatedOrganization, LeaderboardEntry,
    LeaderboardQuery, NewProgram, Organization, OrganizationDetail, OrganizationFilter,
    PlatformStats, Program, UpdateOrganizationRequest, DEFAULT_LEADERBOARD_SIZE,
    MAX_LEADERBOARD_SIZE,
};
use impacts_core::{AppError, ErrorMetadata};
use impacts_db::{OrganizationRepository, ProgramRepository, Repositories};
use impacts_ingest::map_value;
use impacts_ingest::mapper::UNKNOWN_GRADE;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct OrganizationService {
    organizations: Arc<dyn OrganizationRepository>,
    programs: Arc<dyn ProgramRepository>,
    max_batch_size: usize,
}

/// One page of organizations plus the unpaged total
#[derive(Debug, Clone)]
pub struct OrganizationPage {
    pub items: Vec<Organization>,
    pub total: i64,
}

fn not_found(id: Uuid) -> AppError {
    AppError::OrganizationNotFound(format!("Organization {} not found", id))
}

/// Trim required text and derive counts from programs when any are listed.
fn normalize(mut request: CreateOrganizationRequest) -> CreateOrganizationRequest {
    request.name = request.name.trim().to_string();
    request.sector = request.sector.trim().to_string();
    request.region = request.region.trim().to_string();
    if request.impact_grade.trim().is_empty() {
        request.impact_grade = UNKNOWN_GRADE.to_string();
    }
    if !request.programs.is_empty() {
        request.program_count = i32::try_from(request.programs.len()).unwrap_or(i32::MAX);
        request.beneficiary_count = request
            .programs
            .iter()
            .map(|p| p.people_reached)
            .fold(0, i64::saturating_add);
    }
    request
}

fn validate_request(request: &CreateOrganizationRequest) -> Result<(), AppError> {
    request.validate()?;
    for (i, program) in request.programs.iter().enumerate() {
        program.validate().map_err(|e| {
            AppError::InvalidInput(format!("Program {}: {}", i + 1, e))
        })?;
    }
    Ok(())
}

impl OrganizationService {
    pub fn new(repos: &Repositories, max_batch_size: usize) -> Self {
        Self {
            organizations: repos.organizations.clone(),
            programs: repos.programs.clone(),
            max_batch_size,
        }
    }

    #[tracing::instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(
        &self,
        request: CreateOrganizationRequest,
    ) -> Result<CreatedOrganization, AppError> {
        let request = normalize(request);
        validate_request(&request)?;
        let org = self.organizations.create(request).await?;
        tracing::info!(organization_id = %org.id, sector = %org.sector, "Organization created");
        Ok(CreatedOrganization {
            id: org.id,
            name: org.name,
        })
    }

    /// Insert every element independently and report failures by index.
    ///
    /// Elements may use the canonical shape or the loose ingestion shape; both
    /// go through the field mapper before full validation.
    pub async fn create_batch(&self, items: Vec<Value>) -> Result<BatchImportReport, AppError> {
        if items.len() > self.max_batch_size {
            return Err(AppError::PayloadTooLarge(format!(
                "Batch contains {} organizations; the limit is {}",
                items.len(),
                self.max_batch_size
            )));
        }

        let current_year = Utc::now().year();
        let mut report = BatchImportReport::default();
        for (index, item) in items.iter().enumerate() {
            let outcome = match map_value(item, current_year) {
                Ok(candidate) => self.create(candidate).await.map(drop),
                Err(e) => Err(AppError::InvalidInput(e.to_string())),
            };
            match outcome {
                Ok(()) => report.record_success(),
                Err(e) => {
                    tracing::debug!(index, error = %e, "Batch item rejected");
                    report.record_failure(index, batch_item_message(&e));
                }
            }
        }

        tracing::info!(
            total = items.len(),
            successful = report.successful,
            failed = report.failed,
            "Organization batch processed"
        );
        Ok(report)
    }

    pub async fn get(&self, id: Uuid) -> Result<OrganizationDetail, AppError> {
        self.organizations
            .get_detail(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn list(&self, filter: OrganizationFilter) -> Result<OrganizationPage, AppError> {
        let items = self.organizations.list(&filter).await?;
        let total = self.organizations.count(&filter).await?;
        Ok(OrganizationPage { items, total })
    }

    pub async fn update(
        &self,
        id: Uuid,
        mut update: UpdateOrganizationRequest,
    ) -> Result<Organization, AppError> {
        update.validate()?;
        for field in [&mut update.name, &mut update.sector, &mut update.region] {
            if let Some(value) = field.as_mut() {
                *value = value.trim().to_string();
            }
        }
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        let org = self
            .organizations
            .update(id, &update)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(organization_id = %id, "Organization updated");
        Ok(org)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.organizations.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(organization_id = %id, "Organization deleted");
        Ok(())
    }

    pub async fn list_programs(&self, organization_id: Uuid) -> Result<Vec<Program>, AppError> {
        if self.organizations.get(organization_id).await?.is_none() {
            return Err(not_found(organization_id));
        }
        Ok(self.programs.list_for_organization(organization_id).await?)
    }

    pub async fn add_program(
        &self,
        organization_id: Uuid,
        mut program: NewProgram,
    ) -> Result<Program, AppError> {
        program.name = program.name.trim().to_string();
        program.validate()?;
        self.programs
            .create(organization_id, program)
            .await?
            .ok_or_else(|| not_found(organization_id))
    }

    pub async fn leaderboard(
        &self,
        sector: Option<String>,
        region: Option<String>,
        limit: Option<i64>,
    ) -> Result<Vec<LeaderboardEntry>, AppError> {
        let query = LeaderboardQuery {
            sector: sector.filter(|s| !s.trim().is_empty()),
            region: region.filter(|r| !r.trim().is_empty()),
            limit: limit
                .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
                .clamp(1, MAX_LEADERBOARD_SIZE),
        };
        Ok(self.organizations.leaderboard(&query).await?)
    }

    pub async fn stats(&self) -> Result<PlatformStats, AppError> {
        Ok(self.organizations.stats().await?)
    }
}

/// Validation messages are useful per item; anything else stays generic.
fn batch_item_message(err: &AppError) -> String {
    match err {
        AppError::InvalidInput(msg) | AppError::BadRequest(msg) => msg.clone(),
        other => other.client_message(),
    }
}
