//! HTTP client for the Basic Impacts API.
//!
//! Wraps the admin and public endpoints with typed methods (parse, preview,
//! upload, create, batch, list, leaderboard) and provides [`HttpGateway`], the
//! network-backed [`impacts_ingest::PersistenceGateway`] used by the CLI.

pub mod api;
pub mod gateway;

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

pub use api::{OrganizationListParams, OrganizationPage};
pub use gateway::HttpGateway;

/// Server address used when `IMPACTS_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Route prefix shared by every endpoint
pub const API_PREFIX: &str = "/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Failure of a single request, kept typed so callers can branch on status.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Failed to send request: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse response as JSON: {0}")]
    Decode(#[source] reqwest::Error),
}

/// HTTP client with an optional admin key.
///
/// The key is sent as `Authorization: Bearer`. Public endpoints work without it.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    admin_key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, admin_key: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_key: admin_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Build from `IMPACTS_API_URL` and `ADMIN_API_KEY`.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            std::env::var("IMPACTS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let admin_key = std::env::var("ADMIN_API_KEY").ok();
        Self::new(base_url, admin_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_admin_key(&self) -> bool {
        self.admin_key.is_some()
    }

    /// `path` is relative to [`API_PREFIX`], e.g. `/organizations`.
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.admin_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RequestError> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .map_err(RequestError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RequestError::Status { status, body });
        }

        response.json().await.map_err(RequestError::Decode)
    }

    pub(crate) async fn get_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, RequestError> {
        let mut request = self.client.get(self.build_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        self.send(request).await
    }

    pub(crate) async fn post_json_typed<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RequestError> {
        self.send(self.client.post(self.build_url(path)).json(body))
            .await
    }

    /// GET with optional query parameters.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<T> {
        Ok(self.get_typed(path, query).await?)
    }

    /// POST a JSON body and deserialize the response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<T> {
        Ok(self.post_json_typed(path, body).await?)
    }

    /// POST a multipart form and deserialize the response.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> anyhow::Result<T> {
        Ok(self
            .send(self.client.post(self.build_url(path)).multipart(form))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash() {
        let client = ApiClient::new("http://localhost:4000/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:4000");
        assert_eq!(
            client.build_url("/organizations"),
            "http://localhost:4000/api/organizations"
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let client = ApiClient::new(DEFAULT_API_URL, Some("  ".to_string())).unwrap();
        assert!(!client.has_admin_key());
        let client = ApiClient::new(DEFAULT_API_URL, Some("k".to_string())).unwrap();
        assert!(client.has_admin_key());
    }

    #[test]
    fn status_error_message() {
        let err = RequestError::Status {
            status: StatusCode::NOT_FOUND,
            body: "{}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "API request failed with status 404 Not Found: {}"
        );
    }
}
