//! Persistence contract for approved candidates.

use async_trait::async_trait;
use impacts_core::models::{BatchImportReport, CreateOrganizationRequest, CreatedOrganization};
use serde_json::Value;

/// Fixed message shown for any single-create failure
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create organization";

/// Transport or server failure. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// What the operator sees. Details stay in the logs.
    pub fn client_message(&self) -> &'static str {
        CREATE_FAILED_MESSAGE
    }
}

/// Where approved organizations go. Implemented over HTTP by the API client and
/// in memory by tests.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn create_organization(
        &self,
        candidate: &CreateOrganizationRequest,
    ) -> Result<CreatedOrganization, GatewayError>;

    /// Submit every element as one batch; failures are reported per index.
    async fn create_batch(&self, items: &[Value]) -> Result<BatchImportReport, GatewayError>;
}
