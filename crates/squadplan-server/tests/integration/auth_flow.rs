//! Login, logout, and role enforcement through the full router.

use axum::http::StatusCode;

use crate::common::{ALPHA_BETA_JSON, ALPHA_XML, TestHarness, body_text, location};

#[tokio::test]
async fn test_unauthenticated_save_redirects_and_leaves_file() {
    let harness = TestHarness::new();

    let response = harness.save(ALPHA_BETA_JSON, None, None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(harness.file_bytes(), ALPHA_XML.as_bytes());
}

#[tokio::test]
async fn test_unauthenticated_pages_redirect() {
    let harness = TestHarness::new();

    for uri in ["/", "/data", "/export", "/workdays?start=2024-01-03&days=1"] {
        let response = harness.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), Some("/login"), "{uri}");
    }
}

#[tokio::test]
async fn test_login_page_renders() {
    let harness = TestHarness::new();

    let response = harness.get("/login", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/login""#));
}

#[tokio::test]
async fn test_login_redirects_home_with_cookie() {
    let harness = TestHarness::new();

    let response = harness.post_login("admin", "admin123").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/"));
    let set_cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("squadplan_session="));
    assert!(set_cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn test_bad_credentials_rerender_form() {
    let harness = TestHarness::new();

    let response = harness.post_login("admin", "wrong").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .is_none()
    );
    let html = body_text(response).await;
    assert!(html.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_viewer_cannot_save() {
    let harness = TestHarness::new();
    let cookie = harness.login("viewer", "viewer123").await;

    let response = harness.save(ALPHA_BETA_JSON, Some(&cookie), None).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(harness.file_bytes(), ALPHA_XML.as_bytes());
}

#[tokio::test]
async fn test_viewer_can_read() {
    let harness = TestHarness::new();
    let cookie = harness.login("viewer", "viewer123").await;

    let response = harness.get("/data", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = harness.get("/", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("const IS_ADMIN = false;"));
    assert!(html.contains("Thu, Fri"));
}

#[tokio::test]
async fn test_admin_page_enables_saving() {
    let harness = TestHarness::new();
    let cookie = harness.login("admin", "admin123").await;

    let response = harness.get("/", Some(&cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("const IS_ADMIN = true;"));
    assert!(html.contains("const DAY_PX = 32;"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let harness = TestHarness::new();
    let cookie = harness.login("admin", "admin123").await;
    assert_eq!(
        harness.get("/data", Some(&cookie)).await.status(),
        StatusCode::OK
    );

    let response = harness.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));

    let response = harness.get("/data", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_logout_without_session_is_idempotent() {
    let harness = TestHarness::new();

    let response = harness.get("/logout", None).await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn test_forged_cookie_is_anonymous() {
    let harness = TestHarness::new();

    let response = harness
        .get("/data", Some("squadplan_session=not-a-signed-token"))
        .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_bypass_grants_admin_without_login() {
    let harness = TestHarness::bypass();

    let response = harness.get("/data", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = harness.save(ALPHA_BETA_JSON, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bypass_login_accepts_anything() {
    let harness = TestHarness::bypass();

    let response = harness.post_login("someone", "whatever").await;

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/"));
}

#[tokio::test]
async fn test_bypass_logins_record_no_sessions() {
    let harness = TestHarness::bypass();

    for n in 0..50 {
        let response = harness.post_login(&format!("user{n}"), "x").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(
            response
                .headers()
                .get(axum::http::header::SET_COOKIE)
                .is_none()
        );
    }

    assert!(harness.state.sessions.is_empty());
}

#[tokio::test]
async fn test_repeated_logins_stay_within_session_limit() {
    let harness = TestHarness::new();

    for _ in 0..20 {
        harness.login("viewer", "viewer123").await;
    }
    // The same browser logging in again replaces its session.
    let mut cookie = harness.login("admin", "admin123").await;
    for _ in 0..5 {
        let response = harness
            .send(
                axum::http::Request::post("/login")
                    .header(
                        axum::http::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .header(axum::http::header::COOKIE, &cookie)
                    .body(axum::body::Body::from("username=admin&password=admin123"))
                    .unwrap(),
            )
            .await;
        cookie = crate::common::session_cookie_from(&response).unwrap();
    }

    assert_eq!(harness.state.sessions.len(), 21);
    assert!(harness.state.sessions.len() <= squadplan_auth::DEFAULT_MAX_SESSIONS);
    assert_eq!(harness.get("/data", Some(&cookie)).await.status(), StatusCode::OK);
}
