use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use impacts_core::models::{VerificationLevel, VerificationRequest, VerificationStatus};

const VERIFICATION_COLUMNS: &str =
    "id, organization_id, request_type, status, assigned_to, review_notes, created_at, updated_at";

#[async_trait]
pub trait VerificationRepository: Send + Sync {
    async fn create(
        &self,
        organization_id: Uuid,
        request_type: VerificationLevel,
    ) -> Result<VerificationRequest>;

    async fn get(&self, id: Uuid) -> Result<Option<VerificationRequest>>;

    /// Oldest first, so the review queue reads in arrival order
    async fn list(
        &self,
        status: Option<VerificationStatus>,
        organization_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VerificationRequest>>;

    /// Set the assignee. Repeating the same assignment is a no-op.
    async fn assign(&self, id: Uuid, assigned_to: &str) -> Result<Option<VerificationRequest>>;

    /// Record a decision. Only pending requests are touched; `None` otherwise.
    async fn decide(
        &self,
        id: Uuid,
        status: VerificationStatus,
        review_notes: &str,
    ) -> Result<Option<VerificationRequest>>;
}

#[derive(Clone)]
pub struct PostgresVerificationRepository {
    pool: PgPool,
}

impl PostgresVerificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationRepository for PostgresVerificationRepository {
    async fn create(
        &self,
        organization_id: Uuid,
        request_type: VerificationLevel,
    ) -> Result<VerificationRequest> {
        let now = Utc::now();
        let row = sqlx::query_as::<Postgres, VerificationRequest>(&format!(
            r#"
            INSERT INTO verification_requests (
                id, organization_id, request_type, status, review_notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, 'pending', '', $4, $4)
            RETURNING {VERIFICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(organization_id)
        .bind(request_type)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create verification request")?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<VerificationRequest>> {
        let row = sqlx::query_as::<Postgres, VerificationRequest>(&format!(
            "SELECT {VERIFICATION_COLUMNS} FROM verification_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get verification request")?;
        Ok(row)
    }

    async fn list(
        &self,
        status: Option<VerificationStatus>,
        organization_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<VerificationRequest>> {
        let rows = sqlx::query_as::<Postgres, VerificationRequest>(&format!(
            r#"
            SELECT {VERIFICATION_COLUMNS}
            FROM verification_requests
            WHERE ($1::verification_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR organization_id = $2)
            ORDER BY created_at ASC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(status)
        .bind(organization_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list verification requests")?;
        Ok(rows)
    }

    async fn assign(&self, id: Uuid, assigned_to: &str) -> Result<Option<VerificationRequest>> {
        let row = sqlx::query_as::<Postgres, VerificationRequest>(&format!(
            r#"
            UPDATE verification_requests
            SET assigned_to = $2,
                updated_at = CASE WHEN assigned_to IS DISTINCT FROM $2 THEN $3 ELSE updated_at END
            WHERE id = $1
            RETURNING {VERIFICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(assigned_to)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to assign verification request")?;
        Ok(row)
    }

    async fn decide(
        &self,
        id: Uuid,
        status: VerificationStatus,
        review_notes: &str,
    ) -> Result<Option<VerificationRequest>> {
        let row = sqlx::query_as::<Postgres, VerificationRequest>(&format!(
            r#"
            UPDATE verification_requests
            SET status = $2, review_notes = $3, updated_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING {VERIFICATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(review_notes)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to record verification decision")?;
        Ok(row)
    }
}
