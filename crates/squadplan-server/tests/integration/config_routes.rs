//! Reading, saving, exporting, and date routes.

use axum::http::{StatusCode, header};
use squadplan_core::Configuration;
use squadplan_server::HealthResponse;

use crate::common::{ALPHA_BETA_JSON, ALPHA_XML, TestHarness, body_text};

#[tokio::test]
async fn test_data_returns_configuration_with_etag() {
    let harness = TestHarness::new();
    let cookie = harness.login("admin", "admin123").await;

    let response = harness.get("/data", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let etag = response.headers().get(header::ETAG).unwrap().to_str().unwrap();
    assert!(etag.starts_with('"') && etag.ends_with('"'));
    let config: Configuration = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(config.squad_names(), vec!["Alpha"]);
    let alpha = config.get("Alpha").unwrap();
    assert_eq!(alpha.start_date, "2024-01-01");
    assert_eq!(alpha.engineers["FE"], 0.5);
    assert_eq!(alpha.projects[0].concurrency["BE"], 1);
}

#[tokio::test]
async fn test_admin_save_then_reload_keeps_order() {
    let harness = TestHarness::new();
    let cookie = harness.login("admin", "admin123").await;

    let response = harness.save(ALPHA_BETA_JSON, Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::ETAG).is_some());
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, serde_json::json!({ "status": "ok" }));

    let response = harness.get("/data", Some(&cookie)).await;
    let config: Configuration = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(config.squad_names(), vec!["Alpha", "Beta"]);
    assert!(config.get("Beta").unwrap().projects.is_empty());
}

#[tokio::test]
async fn test_save_rejects_malformed_json() {
    let harness = TestHarness::new();
    let cookie = harness.login("admin", "admin123").await;

    let response = harness.save("{\"Alpha\": 3}", Some(&cookie), None).await;

    assert!(response.status().is_client_error());
    assert_eq!(harness.file_bytes(), ALPHA_XML.as_bytes());
}

#[tokio::test]
async fn test_save_with_current_version_succeeds() {
    let harness = TestHarness::new();
    let cookie = harness.login("admin", "admin123").await;
    let response = harness.get("/data", Some(&cookie)).await;
    let etag = response
        .headers()
        .get(header::ETAG)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let response = harness
        .save(ALPHA_BETA_JSON, Some(&cookie), Some(&etag))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let new_etag = response.headers().get(header::ETAG).unwrap().to_str().unwrap();
    assert_ne!(new_etag, etag);
}

#[tokio::test]
async fn test_save_with_stale_version_conflicts() {
    let harness = TestHarness::new();
    let cookie = harness.login("admin", "admin123").await;

    let response = harness
        .save(ALPHA_BETA_JSON, Some(&cookie), Some("\"stale\""))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["category"], "version_conflict");
    assert_eq!(harness.file_bytes(), ALPHA_XML.as_bytes());
}

#[tokio::test]
async fn test_allow_list_rejects_unknown_label_on_save() {
    let harness = TestHarness::with_settings(|settings| {
        settings.categories = squadplan_core::CategoryPolicy::from_list(Some("BE,FE"));
    });

    let response = harness.save(ALPHA_BETA_JSON, None, None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["category"], "invalid_label");
    assert_eq!(harness.file_bytes(), ALPHA_XML.as_bytes());
}

#[tokio::test]
async fn test_missing_file_is_server_error() {
    let harness = TestHarness::bypass();
    std::fs::remove_file(&harness.path).unwrap();

    let response = harness.get("/data", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["category"], "not_found");
}

#[tokio::test]
async fn test_data_raw_needs_no_login() {
    let harness = TestHarness::new();

    let response = harness.get("/data_raw", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, ALPHA_XML);
}

#[tokio::test]
async fn test_export_is_attachment() {
    let harness = TestHarness::new();
    let cookie = harness.login("viewer", "viewer123").await;

    let response = harness.get("/export", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert_eq!(
        disposition,
        "attachment; filename=\"resource_config.xml\""
    );
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/xml"
    );
    assert_eq!(body_text(response).await, ALPHA_XML);
}

#[tokio::test]
async fn test_healthz_reports_file() {
    let harness = TestHarness::new();

    let response = harness.get("/healthz", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert!(health.exists);
    assert!(health.is_file);
    assert_eq!(health.size_bytes, Some(ALPHA_XML.len() as u64));
}

#[tokio::test]
async fn test_workdays_skips_weekend() {
    let harness = TestHarness::bypass();

    // Wednesday + 1 work day skips Thursday and Friday.
    let response = harness.get("/workdays?start=2024-01-03&days=1", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "start": "2024-01-03", "days": 1, "end": "2024-01-06" })
    );
}

#[tokio::test]
async fn test_workdays_rejects_bad_query() {
    let harness = TestHarness::bypass();

    let response = harness.get("/workdays?start=yesterday&days=1", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workdays_whole_week_weekend_is_server_error() {
    let harness = TestHarness::with_settings(|settings| {
        settings.auth.bypass = true;
        settings.weekend = squadplan_core::WeekendDays::from_indices(0..7).unwrap();
    });

    let response = harness.get("/workdays?start=2024-01-03&days=0", None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["error"]["category"], "invalid_configuration");
}
