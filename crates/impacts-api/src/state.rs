//! Application state shared by every handler.

use impacts_core::Config;
use impacts_ingest::UploadLimits;
use sqlx::PgPool;

use crate::services::{InvitationService, OrganizationService, VerificationService, WorkflowService};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Present only with the Postgres backend; readiness checks ping it.
    pub pool: Option<PgPool>,
    pub upload_limits: UploadLimits,
    pub organizations: OrganizationService,
    pub invitations: InvitationService,
    pub verifications: VerificationService,
    pub workflows: WorkflowService,
}
