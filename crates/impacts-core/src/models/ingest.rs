//! Wire types for the JSON ingestion endpoints
//!
//! Shared by the API handlers and the HTTP client so both ends agree on the
//! `{parsed, data?, error?}` envelopes and the batch report shape.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::organization::CreateOrganizationRequest;

/// Body of `POST /api/organizations/parse` and `/preview`
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub json_data: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub parsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub parsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<CreateOrganizationRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub parsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/organizations/batch`.
///
/// Items stay untyped so a malformed element fails on its own index instead of
/// rejecting the whole request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BatchCreateRequest {
    #[schema(value_type = Vec<Object>)]
    pub organizations: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct BatchItemError {
    pub index: usize,
    pub error: String,
}

/// Outcome of a batch create. Items are inserted independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct BatchImportReport {
    pub successful: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<BatchItemError>>,
}

impl BatchImportReport {
    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self, index: usize, error: impl Into<String>) {
        self.failed += 1;
        self.errors.get_or_insert_with(Vec::new).push(BatchItemError {
            index,
            error: error.into(),
        });
    }

    /// Message shown to the operator once a batch has been submitted
    pub fn summary(&self) -> String {
        format!(
            "Successfully imported {} organizations. Failed: {}.",
            self.successful, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_summary() {
        let report: BatchImportReport = serde_json::from_str(
            r#"{"successful":3,"failed":1,"errors":[{"index":2,"error":"duplicate"}]}"#,
        )
        .unwrap();
        assert_eq!(
            report.summary(),
            "Successfully imported 3 organizations. Failed: 1."
        );
        assert_eq!(report.errors.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn report_omits_errors_when_clean() {
        let mut report = BatchImportReport::default();
        report.record_success();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("errors").is_none());

        report.record_failure(1, "Name is required");
        assert_eq!(report.failed, 1);
        assert_eq!(report.errors.unwrap()[0].index, 1);
    }

    #[test]
    fn parse_request_uses_camel_case() {
        let req: ParseRequest = serde_json::from_str(r#"{"jsonData":"{}"}"#).unwrap();
        assert_eq!(req.json_data, "{}");
    }
}
