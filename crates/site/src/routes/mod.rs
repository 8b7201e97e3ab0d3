//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                  - Portfolio page
//! GET  /health                            - Health check
//! POST /contact                           - Contact form (JSON)
//!
//! # Admin sign-in
//! GET  /admin/login                       - Credential form
//! POST /admin/login                       - Submit credentials
//! GET  /admin/otp                         - One-time code form
//! POST /admin/otp                         - Confirm code
//! POST /admin/logout                      - Sign out
//!
//! # Admin back office (requires auth)
//! GET  /admin                             - Dashboard
//! GET  /admin/projects                    - Project list
//! POST /admin/projects                    - Create project (multipart)
//! GET  /admin/projects/new                - New project form
//! GET  /admin/projects/{id}/edit          - Edit project form
//! POST /admin/projects/{id}               - Update project (multipart)
//! POST /admin/projects/{id}/delete        - Delete project
//! GET  /admin/certifications              - Certification list
//! POST /admin/certifications              - Create certification (multipart)
//! GET  /admin/certifications/new          - New certification form
//! GET  /admin/certifications/{id}/edit    - Edit certification form
//! POST /admin/certifications/{id}         - Update certification (multipart)
//! POST /admin/certifications/{id}/delete  - Delete certification
//! ```

pub mod admin;
pub mod contact;
pub mod home;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::{
    contact_rate_limiter, create_session_layer, request_id_middleware,
    security_headers_middleware,
};
use crate::state::AppState;

/// Create the public portfolio routes.
pub fn site_routes(rate_limit: bool) -> Router<AppState> {
    let contact = if rate_limit {
        post(contact::submit).layer(contact_rate_limiter())
    } else {
        post(contact::submit)
    };

    Router::new()
        .route("/", get(home::home))
        .route("/contact", contact)
}

/// Build the complete application with every middleware layer applied.
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let rate_limit = config.rate_limit;
    let session_layer = create_session_layer(config);
    let static_dir = ServeDir::new(&config.static_dir);

    Router::new()
        .route("/health", get(health))
        .merge(site_routes(rate_limit))
        .merge(admin::routes(rate_limit))
        .nest_service("/static", static_dir)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri().path(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
async fn health() -> &'static str {
    "ok"
}
