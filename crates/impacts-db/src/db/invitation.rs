use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use impacts_core::models::{Invitation, InvitationStatus};

const INVITATION_COLUMNS: &str =
    "id, email, role, organization_id, status, token, expires_at, created_at, updated_at";

#[async_trait]
pub trait InvitationRepository: Send + Sync {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation>;

    async fn get(&self, id: Uuid) -> Result<Option<Invitation>>;

    /// Newest first
    async fn list(
        &self,
        status: Option<InvitationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invitation>>;

    /// Persist status, token and expiry changes.
    async fn save(&self, invitation: &Invitation) -> Result<Option<Invitation>>;
}

#[derive(Clone)]
pub struct PostgresInvitationRepository {
    pool: PgPool,
}

impl PostgresInvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvitationRepository for PostgresInvitationRepository {
    async fn create(&self, invitation: &Invitation) -> Result<Invitation> {
        let row = sqlx::query_as::<Postgres, Invitation>(&format!(
            r#"
            INSERT INTO invitations (
                id, email, role, organization_id, status, token, expires_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invitation.id)
        .bind(&invitation.email)
        .bind(&invitation.role)
        .bind(invitation.organization_id)
        .bind(invitation.status)
        .bind(&invitation.token)
        .bind(invitation.expires_at)
        .bind(invitation.created_at)
        .bind(invitation.updated_at)
        .fetch_one(&self.pool)
        .await
        .context("Failed to create invitation")?;
        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<Postgres, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get invitation")?;
        Ok(row)
    }

    async fn list(
        &self,
        status: Option<InvitationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Invitation>> {
        let rows = sqlx::query_as::<Postgres, Invitation>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE ($1::invitation_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list invitations")?;
        Ok(rows)
    }

    async fn save(&self, invitation: &Invitation) -> Result<Option<Invitation>> {
        let row = sqlx::query_as::<Postgres, Invitation>(&format!(
            r#"
            UPDATE invitations
            SET status = $2, token = $3, expires_at = $4, updated_at = $5
            WHERE id = $1
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(invitation.id)
        .bind(invitation.status)
        .bind(&invitation.token)
        .bind(invitation.expires_at)
        .bind(invitation.updated_at)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to update invitation")?;
        Ok(row)
    }
}
