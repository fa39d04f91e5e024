//! Client and gateway against a live in-memory server on a loopback port.

use impacts_api::setup::{routes, services};
use impacts_api_client::{ApiClient, HttpGateway, OrganizationListParams};
use impacts_core::{Config, ImpactsConfig};
use impacts_db::Repositories;
use impacts_ingest::{import_batch, GatewayError, ImportSession, IngestError, PersistenceGateway};

const ADMIN_KEY: &str = "client-test-admin-key-of-32-characters-plus";

async fn spawn_server(admin_key: Option<&str>) -> String {
    let mut config = ImpactsConfig::development();
    config.admin_api_key = admin_key.map(str::to_string);
    let config = Config::new(config);
    let state = services::initialize_services(&config, Repositories::in_memory(), None);
    let router = routes::setup_routes(&config, state).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn session_approval_creates_through_gateway() {
    let base = spawn_server(Some(ADMIN_KEY)).await;
    let client = ApiClient::new(&base, Some(ADMIN_KEY.to_string())).unwrap();
    let gateway = HttpGateway::new(client.clone());

    let mut session = ImportSession::new(2025);
    session
        .parse(r#"{"organization_name":"River Trust","cause_area":"Environment","location":{"province":"BC"}}"#)
        .unwrap();
    session.preview().unwrap();
    let created = session.approve(&gateway).await.unwrap().clone();
    assert_eq!(created.name, "River Trust");

    let detail = client.get_organization(created.id).await.unwrap();
    assert_eq!(detail.organization.sector, "Environment");

    let page = client
        .list_organizations(&OrganizationListParams::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn missing_key_is_rejected_with_status() {
    let base = spawn_server(Some(ADMIN_KEY)).await;
    let gateway = HttpGateway::new(ApiClient::new(&base, None).unwrap());

    let candidate = impacts_core::models::CreateOrganizationRequest {
        name: "Anon".to_string(),
        sector: "Health".to_string(),
        region: "ON".to_string(),
        founding_year: 2000,
        ..Default::default()
    };
    let err = gateway.create_organization(&candidate).await.unwrap_err();
    assert!(matches!(err, GatewayError::Rejected { status: 401, .. }));
    assert_eq!(err.client_message(), "Failed to create organization");
}

#[tokio::test]
async fn batch_import_reports_per_index() {
    let base = spawn_server(None).await;
    let gateway = HttpGateway::new(ApiClient::new(&base, None).unwrap());

    let raw = r#"[
        {"name":"A","sector":"Education","region":"ON"},
        {"name":"B","sector":"Health","region":"QC","impactScore":140}
    ]"#;
    let report = import_batch(raw, &gateway).await.unwrap();
    assert_eq!(report.successful, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.unwrap()[0].index, 1);
}

#[tokio::test]
async fn incomplete_batch_never_reaches_the_server() {
    // Nothing listens here; a network call would surface as a gateway error.
    let gateway = HttpGateway::new(ApiClient::new("http://127.0.0.1:9", None).unwrap());
    let err = import_batch(r#"[{"name":"A"}]"#, &gateway).await.unwrap_err();
    assert!(matches!(err, IngestError::InvalidBatch { invalid: 1, total: 1 }));
}

#[tokio::test]
async fn parse_preview_and_public_reads() {
    let base = spawn_server(None).await;
    let client = ApiClient::new(&base, None).unwrap();

    let parsed = client.parse("{oops").await.unwrap();
    assert!(!parsed.parsed);
    assert!(parsed.error.is_some());

    let preview = client
        .preview(r#"{"name":"Food Bank","sector":"Hunger","region":"MB","impactScore":"77"}"#)
        .await
        .unwrap();
    let candidate = preview.data.unwrap();
    assert_eq!(candidate.impact_score, 77);

    client.create_organization(&candidate).await.unwrap();
    let board = client.leaderboard(Some("Hunger"), None, None).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].rank, 1);

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.total_organizations, 1);
}
