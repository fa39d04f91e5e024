//! [`PersistenceGateway`] over HTTP.

use async_trait::async_trait;
use impacts_core::models::{BatchImportReport, CreateOrganizationRequest, CreatedOrganization};
use impacts_ingest::{GatewayError, PersistenceGateway};
use serde_json::Value;

use crate::{ApiClient, RequestError};

/// Sends approved candidates to `POST /api/organizations` and batches to
/// `POST /api/organizations/batch`. One attempt per call.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: ApiClient,
}

impl HttpGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl From<RequestError> for GatewayError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::Transport(e) => GatewayError::Transport(e.to_string()),
            RequestError::Status { status, body } => GatewayError::Rejected {
                status: status.as_u16(),
                message: body,
            },
            RequestError::Decode(e) => GatewayError::InvalidResponse(e.to_string()),
        }
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateway {
    async fn create_organization(
        &self,
        candidate: &CreateOrganizationRequest,
    ) -> Result<CreatedOrganization, GatewayError> {
        let created = self
            .client
            .post_json_typed("/organizations", candidate)
            .await?;
        Ok(created)
    }

    async fn create_batch(&self, items: &[Value]) -> Result<BatchImportReport, GatewayError> {
        tracing::debug!(count = items.len(), "Posting organization batch");
        let body = serde_json::json!({ "organizations": items });
        let report = self
            .client
            .post_json_typed("/organizations/batch", &body)
            .await?;
        Ok(report)
    }
}
