use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use impacts_core::models::{NewProgram, Program};

use super::organization::PROGRAM_COLUMNS;
use super::transaction::TransactionGuard;

#[async_trait]
pub trait ProgramRepository: Send + Sync {
    async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Program>>;

    /// Add a program and fold it into the owner's program and beneficiary
    /// counts. Returns `None` when the organization does not exist.
    async fn create(&self, organization_id: Uuid, program: NewProgram) -> Result<Option<Program>>;
}

#[derive(Clone)]
pub struct PostgresProgramRepository {
    pool: PgPool,
}

impl PostgresProgramRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgramRepository for PostgresProgramRepository {
    async fn list_for_organization(&self, organization_id: Uuid) -> Result<Vec<Program>> {
        let rows = sqlx::query_as::<Postgres, Program>(&format!(
            "SELECT {PROGRAM_COLUMNS} FROM programs WHERE organization_id = $1 ORDER BY created_at ASC, name ASC"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list programs")?;
        Ok(rows)
    }

    async fn create(&self, organization_id: Uuid, program: NewProgram) -> Result<Option<Program>> {
        let now = Utc::now();
        let program = program.into_program(organization_id, now);
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let updated = sqlx::query(
            r#"
            UPDATE organizations
            SET program_count = program_count + 1,
                beneficiary_count = LEAST(beneficiary_count::numeric + $2, 9223372036854775807)::bigint,
                updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(organization_id)
        .bind(program.people_reached)
        .bind(now)
        .execute(&mut **tx)
        .await
        .context("Failed to update organization counters")?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<Postgres, Program>(&format!(
            r#"
            INSERT INTO programs (
                id, organization_id, name, description, metrics, beneficiaries,
                people_reached, start_year, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PROGRAM_COLUMNS}
            "#
        ))
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
        .fetch_one(&mut **tx)
        .await
        .context("Failed to create program")?;

        tx.commit().await?;
        Ok(Some(row))
    }
}
