//! Domain methods for the API client.
//!
//! Response types come from `impacts_core::models`; [`OrganizationPage`] mirrors
//! the list envelope returned by `GET /api/organizations`.

use std::path::Path;

use anyhow::{Context, Result};
use impacts_core::models::{
    BatchCreateRequest, BatchImportReport, CreateOrganizationRequest, CreatedOrganization,
    LeaderboardEntry, Organization, OrganizationDetail, ParseRequest, ParseResponse,
    PlatformStats, PreviewResponse, UploadResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ApiClient;

/// One page of organizations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationPage {
    pub organizations: Vec<Organization>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Filters for [`ApiClient::list_organizations`]
#[derive(Debug, Clone, Default)]
pub struct OrganizationListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sector: Option<String>,
    pub region: Option<String>,
    pub search: Option<String>,
}

impl OrganizationListParams {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        for (key, value) in [
            ("sector", &self.sector),
            ("region", &self.region),
            ("search", &self.search),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                query.push((key, v.to_string()));
            }
        }
        query
    }
}

impl ApiClient {
    /// Server-side strict parse of pasted text.
    pub async fn parse(&self, json_data: &str) -> Result<ParseResponse> {
        self.post_json(
            "/organizations/parse",
            &ParseRequest {
                json_data: json_data.to_string(),
            },
        )
        .await
    }

    /// Server-side parse and field mapping, without persisting.
    pub async fn preview(&self, json_data: &str) -> Result<PreviewResponse> {
        self.post_json(
            "/organizations/preview",
            &ParseRequest {
                json_data: json_data.to_string(),
            },
        )
        .await
    }

    /// Upload a `.json` or `.txt` file; the server returns its text if it parses.
    pub async fn upload(&self, file_path: &Path) -> Result<UploadResponse> {
        if file_path
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(anyhow::anyhow!("Invalid input: {}", file_path.display()));
        }
        let bytes = read_file(file_path)?;
        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("organization.json");

        let form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
        );
        self.post_multipart("/organizations/upload", form).await
    }

    pub async fn create_organization(
        &self,
        request: &CreateOrganizationRequest,
    ) -> Result<CreatedOrganization> {
        self.post_json("/organizations", request).await
    }

    /// Submit already-validated elements; failures come back per index.
    pub async fn create_batch(&self, organizations: &[Value]) -> Result<BatchImportReport> {
        self.post_json(
            "/organizations/batch",
            &BatchCreateRequest {
                organizations: organizations.to_vec(),
            },
        )
        .await
    }

    pub async fn list_organizations(
        &self,
        params: &OrganizationListParams,
    ) -> Result<OrganizationPage> {
        self.get("/organizations", &params.query()).await
    }

    pub async fn get_organization(&self, id: Uuid) -> Result<OrganizationDetail> {
        self.get(&format!("/organizations/{}", id), &[]).await
    }

    pub async fn leaderboard(
        &self,
        sector: Option<&str>,
        region: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<LeaderboardEntry>> {
        let mut query = Vec::new();
        if let Some(sector) = sector {
            query.push(("sector", sector.to_string()));
        }
        if let Some(region) = region {
            query.push(("region", region.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.get("/leaderboard", &query).await
    }

    pub async fn stats(&self) -> Result<PlatformStats> {
        self.get("/stats", &[]).await
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_skips_blank_filters() {
        let params = OrganizationListParams {
            page: Some(2),
            sector: Some("Health".to_string()),
            region: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            params.query(),
            vec![("page", "2".to_string()), ("sector", "Health".to_string())]
        );
    }

    #[tokio::test]
    async fn upload_rejects_parent_components() {
        let client = ApiClient::new(crate::DEFAULT_API_URL, None).unwrap();
        let err = client
            .upload(Path::new("../secret.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid input"));
    }
}
