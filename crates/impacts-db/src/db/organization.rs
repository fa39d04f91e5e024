//! Organization repository: the aggregate root and its owned records.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use impacts_core::models::{
    CreateOrganizationRequest, LeaderboardEntry, LeaderboardQuery, Metric, Organization,
    OrganizationDetail, OrganizationFilter, Partner, PlatformStats, Program, SectorCount,
    UpdateOrganizationRequest,
};

use super::transaction::TransactionGuard;

pub(crate) const ORGANIZATION_COLUMNS: &str = "id, name, sector, region, website, contact_info, \
    contact_email, mission, description, impact_score, impact_grade, verification_level, \
    founding_year, employee_count, program_count, beneficiary_count, annual_budget, summary, \
    created_at, updated_at";

pub(crate) const PROGRAM_COLUMNS: &str = "id, organization_id, name, description, metrics, \
    beneficiaries, people_reached, start_year, status, created_at";

#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert the organization with its programs, metrics and partners.
    async fn create(&self, request: CreateOrganizationRequest) -> Result<Organization>;

    async fn get(&self, id: Uuid) -> Result<Option<Organization>>;

    /// Organization with everything it owns
    async fn get_detail(&self, id: Uuid) -> Result<Option<OrganizationDetail>>;

    /// Newest first
    async fn list(&self, filter: &OrganizationFilter) -> Result<Vec<Organization>>;

    async fn count(&self, filter: &OrganizationFilter) -> Result<i64>;

    /// Last write wins; returns `None` when the organization does not exist.
    async fn update(
        &self,
        id: Uuid,
        update: &UpdateOrganizationRequest,
    ) -> Result<Option<Organization>>;

    /// Removes the organization and everything it owns.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// Highest impact score first, ties broken by name
    async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>>;

    async fn stats(&self) -> Result<PlatformStats>;
}

#[derive(Clone)]
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    #[tracing::instrument(skip(self, request), fields(db.table = "organizations", db.operation = "insert"))]
    async fn create(&self, request: CreateOrganizationRequest) -> Result<Organization> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let org = sqlx::query_as::<Postgres, Organization>(&format!(
            r#"
            INSERT INTO organizations (
                id, name, sector, region, website, contact_info, contact_email,
                mission, description, impact_score, impact_grade, verification_level,
                founding_year, employee_count, program_count, beneficiary_count,
                annual_budget, summary, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $19)
            RETURNING {ORGANIZATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&request.name)
        .bind(&request.sector)
        .bind(&request.region)
        .bind(&request.website)
        .bind(&request.contact_info)
        .bind(&request.contact_email)
        .bind(&request.mission)
        .bind(&request.description)
        .bind(request.impact_score)
        .bind(&request.impact_grade)
        .bind(request.verification_level)
        .bind(request.founding_year)
        .bind(request.employee_count)
        .bind(request.program_count)
        .bind(request.beneficiary_count)
        .bind(request.annual_budget)
        .bind(&request.summary)
        .bind(now)
        .fetch_one(&mut **tx)
        .await
        .context("Failed to create organization")?;

        for program in request.programs {
            let program = program.into_program(id, now);
            sqlx::query(
                r#"
                INSERT INTO programs (
                    id, organization_id, name, description, metrics, beneficiaries,
                    people_reached, start_year, status, created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(program.id)
            .bind(program.organization_id)
            .bind(&program.name)
            .bind(&program.description)
            .bind(&program.metrics)
            .bind(&program.beneficiaries)
            .bind(program.people_reached)
            .bind(program.start_year)
            .bind(&program.status)
            .bind(program.created_at)
            .execute(&mut **tx)
            .await
            .context("Failed to create program")?;
        }

        for metric in request.metrics {
            let metric = metric.into_metric(id);
            sqlx::query(
                r#"
                INSERT INTO metrics (id, organization_id, name, value, unit, year, category)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(metric.id)
            .bind(metric.organization_id)
            .bind(&metric.name)
            .bind(&metric.value)
            .bind(&metric.unit)
            .bind(metric.year)
            .bind(&metric.category)
            .execute(&mut **tx)
            .await
            .context("Failed to create metric")?;
        }

        for partner in request.partners {
            let partner = partner.into_partner(id);
            sqlx::query(
                r#"
                INSERT INTO partners (id, organization_id, name, role)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(partner.id)
            .bind(partner.organization_id)
            .bind(&partner.name)
            .bind(&partner.role)
            .execute(&mut **tx)
            .await
            .context("Failed to create partner")?;
        }

        tx.commit().await?;
        Ok(org)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<Postgres, Organization>(&format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get organization")?;
        Ok(org)
    }

    async fn get_detail(&self, id: Uuid) -> Result<Option<OrganizationDetail>> {
        let Some(organization) = self.get(id).await? else {
            return Ok(None);
        };

        let programs = sqlx::query_as::<Postgres, Program>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE organization_id = $1 ORDER BY created_at ASC, name ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list programs")?;

        let metrics = sqlx::query_as::<Postgres, Metric>(
            r#"
            SELECT id, organization_id, name, value, unit, year, category
            FROM metrics
            WHERE organization_id = $1
            ORDER BY year DESC, name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list metrics")?;

        let partners = sqlx::query_as::<Postgres, Partner>(
            r#"
            SELECT id, organization_id, name, role
            FROM partners
            WHERE organization_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list partners")?;

        Ok(Some(OrganizationDetail {
            organization,
            programs,
            metrics,
            partners,
        }))
    }

    async fn list(&self, filter: &OrganizationFilter) -> Result<Vec<Organization>> {
        let rows = sqlx::query_as::<Postgres, Organization>(&format!(
            r#"
            SELECT {ORGANIZATION_COLUMNS}
            FROM organizations
            WHERE ($1::text IS NULL OR lower(sector) = lower($1))
              AND ($2::text IS NULL OR lower(region) = lower($2))
              AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
              AND ($4::verification_level IS NULL OR verification_level = $4)
            ORDER BY created_at DESC, id ASC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(filter.sector.as_deref())
        .bind(filter.region.as_deref())
        .bind(filter.search.as_deref())
        .bind(filter.verification_level)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list organizations")?;
        Ok(rows)
    }

    async fn count(&self, filter: &OrganizationFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM organizations
            WHERE ($1::text IS NULL OR lower(sector) = lower($1))
              AND ($2::text IS NULL OR lower(region) = lower($2))
              AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%')
              AND ($4::verification_level IS NULL OR verification_level = $4)
            "#,
        )
        .bind(filter.sector.as_deref())
        .bind(filter.region.as_deref())
        .bind(filter.search.as_deref())
        .bind(filter.verification_level)
        .fetch_one(&self.pool)
        .await
        .context("Failed to count organizations")?;
        Ok(count)
    }

    #[tracing::instrument(skip(self, update), fields(db.table = "organizations", db.operation = "update"))]
    async fn update(
        &self,
        id: Uuid,
        update: &UpdateOrganizationRequest,
    ) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<Postgres, Organization>(&format!(
            r#"
            UPDATE organizations
            SET
                name = COALESCE($2, name),
                sector = COALESCE($3, sector),
                region = COALESCE($4, region),
                website = COALESCE($5, website),
                contact_info = COALESCE($6, contact_info),
                contact_email = COALESCE($7, contact_email),
                mission = COALESCE($8, mission),
                description = COALESCE($9, description),
                impact_score = COALESCE($10, impact_score),
                impact_grade = COALESCE($11, impact_grade),
                verification_level = COALESCE($12, verification_level),
                founding_year = COALESCE($13, founding_year),
                employee_count = COALESCE($14, employee_count),
                beneficiary_count = COALESCE($15, beneficiary_count),
                annual_budget = COALESCE($16, annual_budget),
                summary = COALESCE($17, summary),
                updated_at = $18
            WHERE id = $1
            RETURNING {ORGANIZATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.sector.as_deref())
        .bind(update.region.as_deref())
        .bind(update.website.as_deref())
        .bind(update.contact_info.as_deref())
        .bind(update.contact_email.as_deref())
        .bind(update.mission.as_deref())
        .bind(update.description.as_deref())
        .bind(update.impact_score)
        .bind(update.impact_grade.as_deref())
        .bind(update.verification_level)
        .bind(update.founding_year)
        .bind(update.employee_count)
        .bind(update.beneficiary_count)
        .bind(update.annual_budget)
        .bind(update.summary.as_deref())
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update organization")?;
        Ok(org)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        // Programs, metrics, partners and verification requests cascade.
        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete organization")?;
        Ok(result.rows_affected() > 0)
    }

    async fn leaderboard(&self, query: &LeaderboardQuery) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query_as::<Postgres, Organization>(&format!(
            r#"
            SELECT {ORGANIZATION_COLUMNS}
            FROM organizations
            WHERE ($1::text IS NULL OR lower(sector) = lower($1))
              AND ($2::text IS NULL OR lower(region) = lower($2))
            ORDER BY impact_score DESC, name ASC
            LIMIT $3
            "#
        ))
        .bind(query.sector.as_deref())
        .bind(query.region.as_deref())
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load leaderboard")?;

        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, org)| LeaderboardEntry::from_organization(i as i64 + 1, org))
            .collect())
    }

    async fn stats(&self) -> Result<PlatformStats> {
        let (total, verified, average, beneficiaries): (i64, i64, f64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE verification_level <> 'self_reported'),
                COALESCE(AVG(impact_score), 0)::float8,
                LEAST(COALESCE(SUM(beneficiary_count), 0), 9223372036854775807)::bigint
            FROM organizations
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute platform stats")?;

        let sectors = sqlx::query_as::<Postgres, SectorCount>(
            r#"
            SELECT sector, COUNT(*) AS count
            FROM organizations
            GROUP BY sector
            ORDER BY count DESC, sector ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to count organizations per sector")?;

        Ok(PlatformStats {
            total_organizations: total,
            verified_organizations: verified,
            average_impact_score: average,
            total_beneficiaries: beneficiaries,
            sectors,
        })
    }
}
