//! Test helpers: build the application on the in-memory backend.
//!
//! Run from workspace root: `cargo test -p impacts-api`. No database or
//! containers are needed.

#![allow(dead_code)]

use axum_test::TestServer;
use impacts_api::constants;
use impacts_api::setup::{routes, services};
use impacts_core::{Config, ImpactsConfig};
use impacts_db::Repositories;
use serde_json::{json, Value};

/// Admin key used by apps built with [`setup_test_app_with_key`]
pub const TEST_ADMIN_API_KEY: &str = "test-admin-api-key-at-least-32-characters";

/// API path for tests (e.g. `/api/organizations`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

pub fn bearer() -> String {
    format!("Bearer {}", TEST_ADMIN_API_KEY)
}

pub struct TestApp {
    pub server: TestServer,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Build a server from `config` with fresh in-memory repositories.
pub fn build_app(config: ImpactsConfig) -> TestApp {
    let config = Config::new(config);
    let state = services::initialize_services(&config, Repositories::in_memory(), None);
    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");
    TestApp { server }
}

/// Development configuration: admin routes open.
pub fn setup_test_app() -> TestApp {
    build_app(ImpactsConfig::development())
}

/// Admin routes require [`TEST_ADMIN_API_KEY`].
pub fn setup_test_app_with_key() -> TestApp {
    let mut config = ImpactsConfig::development();
    config.admin_api_key = Some(TEST_ADMIN_API_KEY.to_string());
    build_app(config)
}

/// Canonical create body
pub fn organization_body(name: &str, sector: &str, score: i32) -> Value {
    json!({
        "name": name,
        "sector": sector,
        "region": "ON",
        "impactScore": score,
        "impactGrade": "B",
        "foundingYear": 2010,
        "employeeCount": 12,
    })
}

/// Create an organization through the API and return its id.
pub async fn create_organization(client: &TestServer, body: &Value) -> String {
    let res = client.post(&api_path("/organizations")).json(body).await;
    assert_eq!(res.status_code(), 201, "create organization: {}", res.text());
    let created: Value = res.json();
    created["id"]
        .as_str()
        .expect("id in create response")
        .to_string()
}
