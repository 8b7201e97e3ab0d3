//! Route guard and logout tests.

use axum::http::{Method, StatusCode};
use portfolio_integration_tests::{location, start};
use serde_json::json;

#[tokio::test]
async fn test_guarded_pages_redirect_to_login() {
    let (backend, site) = start().await;

    for path in [
        "/admin",
        "/admin/projects",
        "/admin/projects/new",
        "/admin/projects/1/edit",
        "/admin/certifications",
        "/admin/certifications/new",
    ] {
        let response = site.get(path).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response).as_deref(), Some("/admin/login"), "{path}");
    }

    let response = site.post("/admin/projects/1/delete").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));

    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_pending_login_does_not_pass_guard() {
    let (backend, site) = start().await;
    backend.script(Method::POST, "/api/admin/login", 200, json!({}));
    site.submit_login("a@b.com", "x").await;

    let response = site.get("/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let (backend, site) = start().await;
    backend.respond(Method::GET, "/api/portfolio/projects", 200, json!([]));
    backend.respond(Method::GET, "/api/portfolio/certifications", 200, json!([]));
    site.sign_in(&backend, "tok1").await;

    assert_eq!(site.get("/admin").await.status(), StatusCode::OK);

    let response = site.post("/admin/logout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));

    let response = site.get("/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_login_page_is_public() {
    let (_backend, site) = start().await;

    let response = site.get("/admin/login").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Admin Login"));
}
