//! Service wiring

use crate::services::{
    InvitationService, OrganizationService, VerificationService, WorkflowService,
};
use crate::state::AppState;
use impacts_core::Config;
use impacts_db::Repositories;
use impacts_ingest::UploadLimits;
use sqlx::PgPool;
use std::sync::Arc;

/// Build the application state on top of `repos`.
pub fn initialize_services(
    config: &Config,
    repos: Repositories,
    pool: Option<PgPool>,
) -> Arc<AppState> {
    let upload_limits = UploadLimits {
        max_size_bytes: config.max_upload_size_bytes(),
        allowed_extensions: config.upload_allowed_extensions().to_vec(),
    };

    tracing::info!(
        max_upload_bytes = upload_limits.max_size_bytes,
        allowed_extensions = %upload_limits.allowed_extensions.join(","),
        max_batch_size = config.max_batch_size(),
        "Services initialized"
    );

    Arc::new(AppState {
        config: config.clone(),
        pool,
        upload_limits,
        organizations: OrganizationService::new(&repos, config.max_batch_size()),
        invitations: InvitationService::new(&repos, config.invitation_expiry_days()),
        verifications: VerificationService::new(&repos),
        workflows: WorkflowService::new(&repos),
    })
}
