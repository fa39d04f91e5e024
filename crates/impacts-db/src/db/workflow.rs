//! Workflow repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use impacts_core::models::{CreateWorkflowRequest, UpdateWorkflowRequest, Workflow};

const WORKFLOW_COLUMNS: &str = "id, name, description, steps, active, created_at, updated_at";

#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    async fn create(&self, request: CreateWorkflowRequest) -> Result<Workflow>;

    async fn get(&self, id: Uuid) -> Result<Option<Workflow>>;

    /// Sorted by name
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Workflow>>;

    async fn update(&self, id: Uuid, update: UpdateWorkflowRequest) -> Result<Option<Workflow>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[derive(Clone)]
pub struct PostgresWorkflowRepository {
    pool: PgPool,
}

impl PostgresWorkflowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowRepository for PostgresWorkflowRepository {
    async fn create(&self, request: CreateWorkflowRequest) -> Result<Workflow> {
        let now = Utc::now();
        let w = sqlx::query_as::<Postgres, Workflow>(&format!(
            r#"
            INSERT INTO workflows (id, name, description, steps, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {WORKFLOW_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(&request.description)
        .bind(Json(&request.steps))
        .bind(request.active)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create workflow")?;
        Ok(w)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Workflow>> {
        let w = sqlx::query_as::<Postgres, Workflow>(&format!(
            "SELECT {WORKFLOW_COLUMNS} FROM workflows WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get workflow")?;
        Ok(w)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Workflow>> {
        let rows = sqlx::query_as::<Postgres, Workflow>(&format!(
            r#"
            SELECT {WORKFLOW_COLUMNS}
            FROM workflows
            ORDER BY name ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list workflows")?;
        Ok(rows)
    }

    async fn update(&self, id: Uuid, update: UpdateWorkflowRequest) -> Result<Option<Workflow>> {
        let w = sqlx::query_as::<Postgres, Workflow>(&format!(
            r#"
            UPDATE workflows
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                steps = COALESCE($4, steps),
                active = COALESCE($5, active),
                updated_at = $6
            WHERE id = $1
            RETURNING {WORKFLOW_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(update.description.as_deref())
        .bind(update.steps.as_ref().map(Json))
        .bind(update.active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update workflow")?;
        Ok(w)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workflows WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete workflow")?;
        Ok(result.rows_affected() > 0)
    }
}
