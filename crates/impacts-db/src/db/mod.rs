//! Database repositories for the data access layer
//!
//! Each repository owns one table family. The Postgres implementations are
//! used in production; [`MemoryStore`] backs every trait at once for local
//! development and tests.
//
// Organizations, programs and the other organization-owned records
pub mod organization;
pub mod program;
//
// Back-office: invitations, verification queue, workflow definitions
pub mod invitation;
pub mod verification;
pub mod workflow;
//
// In-process backend
pub mod memory;
//
// Transaction utilities
pub mod transaction;

use std::sync::Arc;

use sqlx::PgPool;

pub use invitation::{InvitationRepository, PostgresInvitationRepository};
pub use memory::MemoryStore;
pub use organization::{OrganizationRepository, PostgresOrganizationRepository};
pub use program::{PostgresProgramRepository, ProgramRepository};
pub use transaction::TransactionGuard;
pub use verification::{PostgresVerificationRepository, VerificationRepository};
pub use workflow::{PostgresWorkflowRepository, WorkflowRepository};

/// Every repository the services need, behind trait objects.
#[derive(Clone)]
pub struct Repositories {
    pub organizations: Arc<dyn OrganizationRepository>,
    pub programs: Arc<dyn ProgramRepository>,
    pub invitations: Arc<dyn InvitationRepository>,
    pub verifications: Arc<dyn VerificationRepository>,
    pub workflows: Arc<dyn WorkflowRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        tracing::info!("Initializing PostgreSQL repositories");
        Self {
            organizations: Arc::new(PostgresOrganizationRepository::new(pool.clone())),
            programs: Arc::new(PostgresProgramRepository::new(pool.clone())),
            invitations: Arc::new(PostgresInvitationRepository::new(pool.clone())),
            verifications: Arc::new(PostgresVerificationRepository::new(pool.clone())),
            workflows: Arc::new(PostgresWorkflowRepository::new(pool)),
        }
    }

    /// All repositories share one store, so deletes cascade across them.
    pub fn in_memory() -> Self {
        tracing::info!("Initializing in-memory repositories");
        let store = MemoryStore::new();
        Self {
            organizations: Arc::new(store.clone()),
            programs: Arc::new(store.clone()),
            invitations: Arc::new(store.clone()),
            verifications: Arc::new(store.clone()),
            workflows: Arc::new(store),
        }
    }
}
