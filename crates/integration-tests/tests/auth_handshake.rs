//! End-to-end tests for the admin sign-in handshake.

use std::time::Duration;

use axum::http::{Method, StatusCode};
use portfolio_integration_tests::{
    TestSite, hung_backend, location, session_cookie, start, unreachable_backend,
};
use portfolio_site::config::SiteConfig;
use serde_json::json;

const LOGIN: &str = "/api/admin/login";
const VERIFY: &str = "/api/admin/verify-otp";

#[tokio::test]
async fn test_full_handshake_reaches_dashboard() {
    let (backend, site) = start().await;
    backend.script(Method::POST, LOGIN, 200, json!({"message": "OTP sent"}));
    backend.script(Method::POST, VERIFY, 200, json!({"token": "tok1"}));
    backend.respond(Method::GET, "/api/portfolio/projects", 200, json!([]));
    backend.respond(Method::GET, "/api/portfolio/certifications", 200, json!([]));

    let response = site.submit_login("a@b.com", "x").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/admin/otp"));

    let login_calls = backend.requests_to(&Method::POST, LOGIN);
    assert_eq!(login_calls.len(), 1);
    assert_eq!(
        login_calls[0].json,
        Some(json!({"email": "a@b.com", "password": "x"}))
    );

    let response = site.get("/admin/otp").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("a@b.com"));

    let response = site.submit_otp("123456").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("OTP verified successfully"));
    assert!(body.contains(r#"content="1;url=/admin""#));

    let verify_calls = backend.requests_to(&Method::POST, VERIFY);
    assert_eq!(
        verify_calls[0].json,
        Some(json!({"email": "a@b.com", "otp": "123456"}))
    );

    let response = site.get("/admin").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Welcome, Admin"));

    // The pending login was consumed.
    let response = site.get("/admin/otp").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_display_name_is_shown() {
    let (backend, site) = start().await;
    backend.respond(Method::GET, "/api/portfolio/projects", 200, json!([]));
    backend.respond(Method::GET, "/api/portfolio/certifications", 200, json!([]));

    site.sign_in(&backend, "abc").await;

    let body = site.get("/admin").await.text().await.unwrap();
    assert!(body.contains("Welcome, Site Owner"));
}

#[tokio::test]
async fn test_rejected_otp_keeps_pending_login() {
    let (backend, site) = start().await;
    backend.script(Method::POST, LOGIN, 200, json!({}));
    backend.script(Method::POST, VERIFY, 401, json!({"message": "expired"}));

    site.submit_login("a@b.com", "x").await;

    let response = site.submit_otp("000000").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.text().await.unwrap();
    assert!(body.contains("expired"));
    assert!(body.contains("a@b.com"));

    let response = site.get("/admin/otp").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = site.get("/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_success_without_token_is_refused() {
    let (backend, site) = start().await;
    backend.script(Method::POST, LOGIN, 200, json!({}));
    backend.script(Method::POST, VERIFY, 200, json!({"name": "X"}));

    site.submit_login("a@b.com", "x").await;

    let response = site.submit_otp("123456").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("The OTP you entered is incorrect or expired.")
    );

    let response = site.get("/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
    assert_eq!(site.get("/admin/otp").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_empty_credentials_never_reach_backend() {
    let (backend, site) = start().await;

    let response = site.submit_login("", "x").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Please enter both Email ID and Password.")
    );

    let response = site.submit_login("a@b.com", "").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_malformed_otp_never_reaches_backend() {
    let (backend, site) = start().await;
    backend.script(Method::POST, LOGIN, 200, json!({}));
    site.submit_login("a@b.com", "x").await;

    for otp in ["12345", "1234567", "12a456"] {
        let response = site.submit_otp(otp).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(
            response
                .text()
                .await
                .unwrap()
                .contains("Please enter a valid 6-digit OTP.")
        );
    }

    assert!(backend.requests_to(&Method::POST, VERIFY).is_empty());
}

#[tokio::test]
async fn test_rejected_credentials_show_backend_message() {
    let (backend, site) = start().await;
    backend.script(Method::POST, LOGIN, 401, json!({"message": "Invalid credentials"}));

    let response = site.submit_login("a@b.com", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.text().await.unwrap().contains("Invalid credentials"));

    let response = site.get("/admin/otp").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_otp_page_requires_pending_login() {
    let (_backend, site) = start().await;

    let response = site.get("/admin/otp").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));

    let response = site.submit_otp("123456").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_unreachable_backend() {
    let site = TestSite::start(unreachable_backend().await).await;

    let response = site.submit_login("a@b.com", "x").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Failed to connect to the server.")
    );
}

#[tokio::test]
async fn test_hung_backend_times_out() {
    let mut config = SiteConfig::for_backend(hung_backend().await);
    config.backend.timeout = Duration::from_secs(1);
    let site = TestSite::start_with(config).await;

    let response = tokio::time::timeout(
        Duration::from_secs(10),
        site.submit_login("a@b.com", "x"),
    )
    .await
    .expect("sign-in should finish once the backend timeout elapses");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Failed to connect to the server.")
    );

    // The timed-out attempt no longer blocks a retry.
    let response = site.submit_login("a@b.com", "x").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_session_id_changes_on_sign_in() {
    let (backend, site) = start().await;
    backend.script(Method::POST, LOGIN, 200, json!({}));
    backend.script(Method::POST, VERIFY, 200, json!({"token": "tok1"}));

    let response = site.submit_login("a@b.com", "x").await;
    let before = session_cookie(&response).expect("session cookie after sign-in");

    let response = site.submit_otp("123456").await;
    assert_eq!(response.status(), StatusCode::OK);
    let after = session_cookie(&response).expect("session cookie after OTP");

    assert_ne!(before, after);
}

#[tokio::test]
async fn test_pending_login_is_per_browser() {
    let (backend, site) = start().await;
    backend.script(Method::POST, LOGIN, 200, json!({}));
    site.submit_login("a@b.com", "x").await;

    let other = site.new_browser();
    let response = other.get("/admin/otp").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}
