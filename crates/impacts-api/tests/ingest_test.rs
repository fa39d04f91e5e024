//! Ingestion endpoint contract tests: parse, preview, upload and batch.

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{api_path, build_app, setup_test_app};
use impacts_core::ImpactsConfig;
use serde_json::{json, Value};

#[tokio::test]
async fn parse_returns_the_parsed_value() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations/parse"))
        .json(&json!({ "jsonData": r#"{"name":"Food Bank","sector":"Hunger"}"# }))
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["parsed"], true);
    assert_eq!(body["data"]["name"], "Food Bank");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn parse_reports_invalid_json_inline() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations/parse"))
        .json(&json!({ "jsonData": "{\"name\": " }))
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["parsed"], false);
    assert!(body.get("data").is_none());
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn parse_requires_json_data_field() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations/parse"))
        .json(&json!({ "text": "{}" }))
        .await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn preview_maps_loose_records() {
    let app = setup_test_app();
    let raw = json!({
        "organization_name": "Northern Lights Literacy",
        "cause_area": "Education",
        "province": "MB",
        "founded": 2004,
        "key_programs": [
            {"program_name": "Reading Circles", "people_reached": 300},
            {"program_name": "Summer Camp", "people_reached": 120}
        ]
    })
    .to_string();
    let res = app
        .client()
        .post(&api_path("/organizations/preview"))
        .json(&json!({ "jsonData": raw }))
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["parsed"], true);
    let data = &body["data"];
    assert_eq!(data["name"], "Northern Lights Literacy");
    assert_eq!(data["sector"], "Education");
    assert_eq!(data["region"], "MB");
    assert_eq!(data["foundingYear"], 2004);
    assert_eq!(data["programs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn preview_of_an_array_is_parsed_but_not_mapped() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations/preview"))
        .json(&json!({ "jsonData": "[]" }))
        .await;
    let body: Value = res.json();
    assert_eq!(body["parsed"], true);
    assert!(body.get("data").is_none());
    assert!(body["error"].as_str().unwrap().contains("JSON object"));
}

#[tokio::test]
async fn upload_returns_file_text() {
    let app = setup_test_app();
    let text = r#"{"name":"Clean Water","sector":"Environment","region":"NS"}"#;
    let form = MultipartForm::new().add_part(
        "file",
        Part::text(text).file_name("org.json").mime_type("application/json"),
    );
    let res = app
        .client()
        .post(&api_path("/organizations/upload"))
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["parsed"], true);
    assert_eq!(body["jsonData"], text);
}

#[tokio::test]
async fn upload_with_unparseable_content_reports_error() {
    let app = setup_test_app();
    let form = MultipartForm::new().add_part(
        "file",
        Part::text("not json at all").file_name("notes.txt"),
    );
    let res = app
        .client()
        .post(&api_path("/organizations/upload"))
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), 200);
    let body: Value = res.json();
    assert_eq!(body["parsed"], false);
    assert!(body.get("jsonData").is_none());
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn upload_rejects_other_file_types() {
    let app = setup_test_app();
    let form = MultipartForm::new().add_part(
        "file",
        Part::bytes(vec![0x89, b'P', b'N', b'G'])
            .file_name("logo.png")
            .mime_type("image/png"),
    );
    let res = app
        .client()
        .post(&api_path("/organizations/upload"))
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), 400);
}

#[tokio::test]
async fn upload_over_limit_is_413() {
    let mut config = ImpactsConfig::development();
    config.max_upload_size_bytes = 64;
    let app = build_app(config);
    let big = format!("{{\"name\":\"{}\"}}", "x".repeat(200));
    let form = MultipartForm::new().add_part("file", Part::text(big).file_name("big.json"));
    let res = app
        .client()
        .post(&api_path("/organizations/upload"))
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), 413);
    let body: Value = res.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn upload_without_file_field_is_rejected() {
    let app = setup_test_app();
    let form = MultipartForm::new().add_text("note", "hello");
    let res = app
        .client()
        .post(&api_path("/organizations/upload"))
        .multipart(form)
        .await;
    assert_eq!(res.status_code(), 400);
}

#[tokio::test]
async fn batch_reports_failures_by_index() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations/batch"))
        .json(&json!({
            "organizations": [
                {"name": "Food Bank", "sector": "Hunger", "region": "ON"},
                {"sector": "Health", "region": "QC"},
                {"organization_name": "Shelter Now", "category": "Housing", "province": "BC"}
            ]
        }))
        .await;
    assert_eq!(res.status_code(), 200);
    let report: Value = res.json();
    assert_eq!(report["successful"], 2);
    assert_eq!(report["failed"], 1);
    let errors = report["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["index"], 1);

    let list: Value = app.client().get(&api_path("/organizations")).await.json();
    assert_eq!(list["total"], 2);
}

#[tokio::test]
async fn clean_batch_omits_errors() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations/batch"))
        .json(&json!({
            "organizations": [{"name": "A", "sector": "Education", "region": "ON"}]
        }))
        .await;
    let report: Value = res.json();
    assert_eq!(report["successful"], 1);
    assert_eq!(report["failed"], 0);
    assert!(report.get("errors").is_none());
}

#[tokio::test]
async fn oversized_batch_is_rejected_whole() {
    let mut config = ImpactsConfig::development();
    config.max_batch_size = 2;
    let app = build_app(config);
    let item = json!({"name": "A", "sector": "Education", "region": "ON"});
    let res = app
        .client()
        .post(&api_path("/organizations/batch"))
        .json(&json!({ "organizations": [item.clone(), item.clone(), item] }))
        .await;
    assert_eq!(res.status_code(), 413);

    let list: Value = app.client().get(&api_path("/organizations")).await.json();
    assert_eq!(list["total"], 0);
}
