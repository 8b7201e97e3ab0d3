//! Admin project and certification management against the mock backend.

use axum::http::{Method, StatusCode};
use portfolio_integration_tests::{MockBackend, TestSite, location, start};
use reqwest::multipart::{Form, Part};
use serde_json::json;

const ADMIN_PROJECTS: &str = "/api/portfolio/admin/projects";

async fn signed_in() -> (MockBackend, TestSite) {
    let (backend, site) = start().await;
    site.sign_in(&backend, "tok1").await;
    (backend, site)
}

async fn post_form(site: &TestSite, path: &str, form: Form) -> reqwest::Response {
    site.client
        .post(site.url(path))
        .multipart(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_project_sends_bearer_token() {
    let (backend, site) = signed_in().await;
    backend.script(Method::POST, ADMIN_PROJECTS, 201, json!({"id": 9}));

    let form = Form::new()
        .text("title", "Portfolio")
        .text("technologies", "Rust, axum")
        .text("live_url", "https://example.com")
        .part(
            "image",
            Part::bytes(b"<svg/>".to_vec())
                .file_name("shot.svg")
                .mime_str("image/svg+xml")
                .unwrap(),
        );
    let response = post_form(&site, "/admin/projects", form).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/admin/projects?notice=created")
    );

    let writes = backend.requests_to(&Method::POST, ADMIN_PROJECTS);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].authorization.as_deref(), Some("Bearer tok1"));
    assert!(
        writes[0]
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("multipart/form-data")
    );
}

#[tokio::test]
async fn test_project_without_title_is_rejected_locally() {
    let (backend, site) = signed_in().await;

    let form = Form::new().text("title", "  ").text("description", "No title");
    let response = post_form(&site, "/admin/projects", form).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.text().await.unwrap();
    assert!(body.contains("Project title is required."));
    assert!(body.contains("No title"));
    assert!(backend.requests_to(&Method::POST, ADMIN_PROJECTS).is_empty());
}

#[tokio::test]
async fn test_backend_error_message_is_shown() {
    let (backend, site) = signed_in().await;
    backend.script(
        Method::POST,
        ADMIN_PROJECTS,
        400,
        json!({"message": "Image too large"}),
    );

    let response = post_form(&site, "/admin/projects", Form::new().text("title", "T")).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(response.text().await.unwrap().contains("Image too large"));
}

#[tokio::test]
async fn test_unauthorized_write_ends_session() {
    let (backend, site) = signed_in().await;
    backend.script(
        Method::DELETE,
        "/api/portfolio/admin/projects/3",
        401,
        json!({"message": "token expired"}),
    );

    let response = site.post("/admin/projects/3/delete").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));

    let response = site.get("/admin").await;
    assert_eq!(location(&response).as_deref(), Some("/admin/login"));
}

#[tokio::test]
async fn test_delete_failure_is_flashed() {
    let (backend, site) = signed_in().await;
    backend.script(
        Method::DELETE,
        "/api/portfolio/admin/projects/3",
        500,
        json!({}),
    );

    let response = site.post("/admin/projects/3/delete").await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/admin/projects?error=delete_failed")
    );

    let deletes = backend.requests_to(&Method::DELETE, "/api/portfolio/admin/projects/3");
    assert_eq!(deletes[0].authorization.as_deref(), Some("Bearer tok1"));
}

#[tokio::test]
async fn test_project_list_and_edit_form() {
    let (backend, site) = signed_in().await;
    backend.respond(
        Method::GET,
        "/api/portfolio/projects",
        200,
        json!([{"id": 3, "title": "Weather App", "technologies": "Rust, htmx"}]),
    );

    let response = site.get("/admin/projects?notice=deleted").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Weather App"));
    assert!(body.contains("Project deleted successfully."));

    let response = site.get("/admin/projects/3/edit").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Edit Project"));
    assert!(body.contains(r#"value="Weather App""#));

    let response = site.get("/admin/projects/99/edit").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_certification_uses_put() {
    let (backend, site) = signed_in().await;
    let path = "/api/portfolio/admin/certifications/7";
    backend.script(Method::PUT, path, 200, json!({}));

    let form = Form::new()
        .text("name", "Cloud Practitioner")
        .text("issuer", "AWS")
        .text("year", "2024");
    let response = post_form(&site, "/admin/certifications/7", form).await;
    assert_eq!(
        location(&response).as_deref(),
        Some("/admin/certifications?notice=updated")
    );

    let writes = backend.requests_to(&Method::PUT, path);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].authorization.as_deref(), Some("Bearer tok1"));
}

#[tokio::test]
async fn test_certification_without_name_is_rejected_locally() {
    let (backend, site) = signed_in().await;

    let response = post_form(
        &site,
        "/admin/certifications",
        Form::new().text("issuer", "AWS"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(
        response
            .text()
            .await
            .unwrap()
            .contains("Certification name is required.")
    );
    assert!(
        backend
            .requests_to(&Method::POST, "/api/portfolio/admin/certifications")
            .is_empty()
    );
}
