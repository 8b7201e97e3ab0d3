//! Route guard and extractors for the admin area.
//!
//! Every protected admin route sits behind [`require_admin_middleware`]; it
//! consults the session on each request and keeps no state of its own.
//! Handlers behind the guard use [`RequireAdmin`] to get the token.

use axum::{
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use crate::auth::SessionStore;

/// Where unauthenticated browsers are sent.
pub const LOGIN_PATH: &str = "/admin/login";

/// Error returned when admin authentication is required but missing.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AdminAuthRejection {
    fn for_path(path: &str) -> Self {
        if path.starts_with("/admin/api/") || path.starts_with("/api/") {
            Self::Unauthorized
        } else {
            Self::RedirectToLogin
        }
    }
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Route guard: admit only sessions holding a confirmed login.
pub async fn require_admin_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();

    let Some(session) = request.extensions().get::<Session>().cloned() else {
        tracing::error!("session layer missing in front of the admin guard");
        return AdminAuthRejection::Unauthorized.into_response();
    };

    match SessionStore::new(session).is_authenticated().await {
        Ok(true) => next.run(request).await,
        Ok(false) => {
            tracing::debug!(path = %path, "unauthenticated admin request");
            AdminAuthRejection::for_path(&path).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to read admin session");
            AdminAuthRejection::for_path(&path).into_response()
        }
    }
}

/// The signed-in admin, as stored in the session.
#[derive(Clone)]
pub struct CurrentAdmin {
    /// Bearer token for backend writes.
    pub token: SecretString,
    /// Display name returned at sign-in, if any.
    pub display_name: Option<String>,
}

impl CurrentAdmin {
    /// Name to greet the admin with.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Admin")
    }
}

/// Extractor that requires admin authentication.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdmin(admin): RequireAdmin,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.greeting_name())
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let rejection = || AdminAuthRejection::for_path(parts.uri.path());

        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::Unauthorized)?;
        let store = SessionStore::new(session);

        if !store.is_authenticated().await.unwrap_or(false) {
            return Err(rejection());
        }

        let token = store.token().await.ok().flatten().ok_or_else(rejection)?;
        let display_name = store.display_name().await.ok().flatten();

        Ok(Self(CurrentAdmin {
            token,
            display_name,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router, body::Body, http::Request as HttpRequest, http::header::LOCATION, middleware,
        routing::get,
    };
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, SessionManagerLayer};

    use super::*;

    async fn whoami(RequireAdmin(admin): RequireAdmin) -> String {
        admin.greeting_name().to_string()
    }

    fn guarded_app(session: Option<Session>) -> Router {
        let router = Router::new()
            .route("/admin", get(whoami))
            .route("/admin/api/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(require_admin_middleware));

        match session {
            Some(session) => router.layer(axum::Extension(session)),
            None => router.layer(SessionManagerLayer::new(MemoryStore::default())),
        }
    }

    fn get_request(uri: &str) -> HttpRequest<Body> {
        HttpRequest::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected_to_login() {
        let response = guarded_app(None).oneshot(get_request("/admin")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), LOGIN_PATH);
    }

    #[tokio::test]
    async fn test_anonymous_api_gets_401() {
        let response = guarded_app(None)
            .oneshot(get_request("/admin/api/ping"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authenticated_session_is_admitted() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let store = SessionStore::new(session.clone());
        store.set_token("tok1").await.unwrap();
        store.set_display_name(Some("Ada")).await.unwrap();
        store.set_authenticated(true).await.unwrap();

        let response = guarded_app(Some(session.clone()))
            .oneshot(get_request("/admin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Ada");

        // Logged out: checked again on the very next request
        store.clear().await.unwrap();
        let response = guarded_app(Some(session))
            .oneshot(get_request("/admin"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[test]
    fn test_greeting_name_fallback() {
        let admin = CurrentAdmin {
            token: SecretString::from("t".to_string()),
            display_name: None,
        };
        assert_eq!(admin.greeting_name(), "Admin");
    }
}
