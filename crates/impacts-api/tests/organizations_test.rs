//! Organization and program API tests.

mod helpers;

use helpers::{api_path, create_organization, organization_body, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn create_get_update_delete_organization() {
    let app = setup_test_app();
    let client = app.client();

    let res = client
        .post(&api_path("/organizations"))
        .json(&organization_body("  Food Bank  ", "Hunger", 72))
        .await;
    assert_eq!(res.status_code(), 201);
    let created: Value = res.json();
    assert_eq!(created["name"], "Food Bank");
    let id = created["id"].as_str().unwrap().to_string();

    let detail: Value = client
        .get(&api_path(&format!("/organizations/{}", id)))
        .await
        .json();
    assert_eq!(detail["name"], "Food Bank");
    assert_eq!(detail["verificationLevel"], "self-reported");
    assert!(detail["programs"].as_array().unwrap().is_empty());

    let res = client
        .put(&api_path(&format!("/organizations/{}", id)))
        .json(&json!({ "impactScore": 80, "verificationLevel": "verified" }))
        .await;
    assert_eq!(res.status_code(), 200);
    let updated: Value = res.json();
    assert_eq!(updated["impactScore"], 80);
    assert_eq!(updated["verificationLevel"], "verified");
    assert_eq!(updated["sector"], "Hunger");

    let res = client
        .delete(&api_path(&format!("/organizations/{}", id)))
        .await;
    assert_eq!(res.status_code(), 204);

    let res = client
        .get(&api_path(&format!("/organizations/{}", id)))
        .await;
    assert_eq!(res.status_code(), 404);
    let body: Value = res.json();
    assert_eq!(body["code"], "ORGANIZATION_NOT_FOUND");
}

#[tokio::test]
async fn create_rejects_missing_required_fields() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations"))
        .json(&json!({ "name": "No Sector", "region": "ON", "foundingYear": 2000 }))
        .await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["recoverable"], false);
}

#[tokio::test]
async fn create_rejects_out_of_range_score() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path("/organizations"))
        .json(&organization_body("Too Good", "Health", 101))
        .await;
    assert_eq!(res.status_code(), 400);
}

#[tokio::test]
async fn create_derives_counts_from_programs() {
    let app = setup_test_app();
    let mut body = organization_body("Literacy Now", "Education", 65);
    body["programs"] = json!([
        {"name": "Reading Circles", "peopleReached": 300},
        {"name": "Homework Club", "peopleReached": 45}
    ]);
    let id = create_organization(app.client(), &body).await;

    let detail: Value = app
        .client()
        .get(&api_path(&format!("/organizations/{}", id)))
        .await
        .json();
    assert_eq!(detail["programCount"], 2);
    assert_eq!(detail["beneficiaryCount"], 345);
    assert_eq!(detail["programs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn list_filters_and_pages() {
    let app = setup_test_app();
    let client = app.client();
    for (name, sector) in [
        ("Alpha Health", "Health"),
        ("Beta Health", "Health"),
        ("Gamma Learning", "Education"),
    ] {
        create_organization(client, &organization_body(name, sector, 50)).await;
    }

    let page: Value = client
        .get(&api_path("/organizations"))
        .add_query_param("sector", "health")
        .add_query_param("limit", 1)
        .await
        .json();
    assert_eq!(page["total"], 2);
    assert_eq!(page["limit"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["organizations"].as_array().unwrap().len(), 1);

    let page: Value = client
        .get(&api_path("/organizations"))
        .add_query_param("search", "learn")
        .await
        .json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["organizations"][0]["name"], "Gamma Learning");
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let app = setup_test_app();
    let client = app.client();
    create_organization(client, &organization_body("Alpha Health", "Health", 50)).await;

    let response = client
        .get(&api_path("/organizations"))
        .add_query_param("page", i64::MAX)
        .add_query_param("limit", 100)
        .await;
    response.assert_status_ok();
    let page: Value = response.json();
    assert_eq!(page["total"], 1);
    assert_eq!(page["limit"], 100);
    assert!(page["organizations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_update_is_bad_request() {
    let app = setup_test_app();
    let id = create_organization(app.client(), &organization_body("A", "Health", 10)).await;
    let res = app
        .client()
        .put(&api_path(&format!("/organizations/{}", id)))
        .json(&json!({}))
        .await;
    assert_eq!(res.status_code(), 400);
    let body: Value = res.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn programs_update_organization_counters() {
    let app = setup_test_app();
    let client = app.client();
    let id = create_organization(client, &organization_body("Shelter Now", "Housing", 40)).await;

    let res = client
        .post(&api_path(&format!("/organizations/{}/programs", id)))
        .json(&json!({ "name": "Winter Beds", "peopleReached": 90, "startYear": 2019 }))
        .await;
    assert_eq!(res.status_code(), 201);
    let program: Value = res.json();
    assert_eq!(program["name"], "Winter Beds");

    let programs: Value = client
        .get(&api_path(&format!("/organizations/{}/programs", id)))
        .await
        .json();
    assert_eq!(programs.as_array().unwrap().len(), 1);

    let detail: Value = client
        .get(&api_path(&format!("/organizations/{}", id)))
        .await
        .json();
    assert_eq!(detail["programCount"], 1);
    assert_eq!(detail["beneficiaryCount"], 90);
}

#[tokio::test]
async fn program_for_unknown_organization_is_404() {
    let app = setup_test_app();
    let res = app
        .client()
        .post(&api_path(&format!(
            "/organizations/{}/programs",
            uuid::Uuid::new_v4()
        )))
        .json(&json!({ "name": "Orphan" }))
        .await;
    assert_eq!(res.status_code(), 404);
}
