//! Admin back office.
//!
//! Sign-in routes are public; everything else sits behind the route guard.
//! Writes are forwarded to the backend with the session's bearer token, and a
//! 401 from the backend ends the session.

pub mod auth;
pub mod certifications;
pub mod dashboard;
pub mod projects;

use std::collections::HashMap;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{MethodRouter, get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::auth::SessionStore;
use crate::backend::ImageUpload;
use crate::error::{AppError, clear_sentry_user};
use crate::middleware::{
    LOGIN_PATH, auth_rate_limiter, rate_limit::RateLimiterLayer, require_admin_middleware,
};
use crate::state::AppState;

/// Largest accepted admin form (image included), in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build the admin routes.
///
/// With `rate_limit`, credential and OTP submissions are limited per client IP.
pub fn routes(rate_limit: bool) -> Router<AppState> {
    let limited = |route: MethodRouter<AppState>, layer: fn() -> RateLimiterLayer| {
        if rate_limit { route.layer(layer()) } else { route }
    };

    let public = Router::new()
        .route(
            "/admin/login",
            get(auth::login_page).merge(limited(post(auth::login), auth_rate_limiter)),
        )
        .route(
            "/admin/otp",
            get(auth::otp_page).merge(limited(post(auth::verify_otp), auth_rate_limiter)),
        )
        .route("/admin/logout", post(auth::logout));

    let protected = Router::new()
        .route("/admin", get(dashboard::index))
        .route(
            "/admin/projects",
            get(projects::index).post(projects::create),
        )
        .route("/admin/projects/new", get(projects::new))
        .route("/admin/projects/{id}", post(projects::update))
        .route("/admin/projects/{id}/edit", get(projects::edit))
        .route("/admin/projects/{id}/delete", post(projects::delete))
        .route(
            "/admin/certifications",
            get(certifications::index).post(certifications::create),
        )
        .route("/admin/certifications/new", get(certifications::new))
        .route("/admin/certifications/{id}", post(certifications::update))
        .route("/admin/certifications/{id}/edit", get(certifications::edit))
        .route(
            "/admin/certifications/{id}/delete",
            post(certifications::delete),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(middleware::from_fn(require_admin_middleware));

    public.merge(protected)
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Flash query parameters shown on list pages after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl FlashQuery {
    /// Notice text for a known notice key.
    #[must_use]
    pub fn notice_text(&self, entity: &str) -> Option<String> {
        let action = match self.notice.as_deref()? {
            "created" => "added",
            "updated" => "updated",
            "deleted" => "deleted",
            _ => return None,
        };
        Some(format!("{entity} {action} successfully."))
    }

    /// Error text for a known error key.
    #[must_use]
    pub fn error_text(&self, entity: &str) -> Option<String> {
        match self.error.as_deref()? {
            "delete_failed" => Some(format!("Failed to delete {}.", entity.to_lowercase())),
            _ => None,
        }
    }
}

/// End the session after the backend refused its token.
pub async fn session_expired(session: Session) -> Response {
    tracing::info!("backend rejected the admin token, signing out");
    if let Err(e) = SessionStore::new(session).clear().await {
        return AppError::from(e).into_response();
    }
    clear_sentry_user();
    Redirect::to(LOGIN_PATH).into_response()
}

/// Text fields and optional image of a multipart admin form.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl MultipartForm {
    /// Read every part of the request body.
    ///
    /// The part named `image` is kept as an upload when it carries a file;
    /// every other part is read as text.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid form data: {e}")))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid image upload: {e}")))?;

                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid form field {name}: {e}")))?;
            form.fields.insert(name, value);
        }

        Ok(form)
    }

    /// A text field, trimmed; missing fields read as empty.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}
