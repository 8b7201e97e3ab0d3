//! Admin sign-in, OTP confirmation and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::auth::{self, AuthError, OTP_VERIFIED, SessionStore};
use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::LOGIN_PATH;
use crate::state::AppState;

/// Where the OTP form lives.
pub const OTP_PATH: &str = "/admin/otp";

/// Where a confirmed admin lands.
pub const DASHBOARD_PATH: &str = "/admin";

// =============================================================================
// Form Types
// =============================================================================

/// Credential form data. Missing fields arrive as empty strings so they get
/// the form's own validation message.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// OTP form data.
#[derive(Debug, Deserialize)]
pub struct OtpForm {
    #[serde(default)]
    pub otp: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Credential form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// OTP form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/otp.html")]
pub struct OtpTemplate {
    pub email: String,
    pub error: Option<String>,
}

/// Success notification shown before forwarding to the dashboard.
#[derive(Template, WebTemplate)]
#[template(path = "admin/otp_success.html")]
pub struct OtpSuccessTemplate {
    pub message: &'static str,
    pub display_name: Option<String>,
    pub redirect_to: &'static str,
    /// Whole seconds before the browser follows `redirect_to`.
    pub delay_secs: u64,
}

/// Status code for a form re-rendered with an error.
fn form_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AuthError::Rejected(_) | AuthError::NoPendingLogin => StatusCode::UNAUTHORIZED,
        AuthError::Connectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::InFlight(_) | AuthError::Stale => StatusCode::CONFLICT,
        AuthError::MissingToken | AuthError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn log_internal(err: &AuthError) {
    if err.is_internal() {
        let event_id = sentry::capture_error(err);
        tracing::error!(error = %err, sentry_event_id = %event_id, "sign-in failed");
    }
}

// =============================================================================
// Credentials
// =============================================================================

/// Display the credential form.
///
/// GET /admin/login
pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {
        email: String::new(),
        error: None,
    }
}

/// Handle credential submission.
///
/// POST /admin/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let store = SessionStore::new(session);
    let password = SecretString::from(form.password);

    match auth::submit_credentials(
        state.backend(),
        state.tracker(),
        &store,
        &form.email,
        &password,
    )
    .await
    {
        Ok(_) => Redirect::to(OTP_PATH).into_response(),
        Err(e) => {
            log_internal(&e);
            (
                form_status(&e),
                LoginTemplate {
                    email: form.email.trim().to_string(),
                    error: Some(e.user_message()),
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// One-Time Passcode
// =============================================================================

/// Display the OTP form, or send the browser back to sign in.
///
/// GET /admin/otp
pub async fn otp_page(session: Session) -> Response {
    match SessionStore::new(session).pending_email().await {
        Ok(Some(email)) => OtpTemplate {
            email: email.into_inner(),
            error: None,
        }
        .into_response(),
        Ok(None) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}

/// Handle OTP submission.
///
/// POST /admin/otp
#[instrument(skip_all)]
pub async fn verify_otp(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<OtpForm>,
) -> Response {
    let store = SessionStore::new(session);

    match auth::confirm_otp(state.backend(), state.tracker(), &store, &form.otp).await {
        Ok(confirmed) => {
            set_sentry_user(confirmed.email.as_str(), confirmed.display_name.as_deref());
            let delay = state.config().otp_redirect_delay;

            OtpSuccessTemplate {
                message: OTP_VERIFIED,
                display_name: confirmed.display_name,
                redirect_to: DASHBOARD_PATH,
                delay_secs: delay.as_millis().div_ceil(1000).try_into().unwrap_or(u64::MAX),
            }
            .into_response()
        }
        Err(AuthError::NoPendingLogin) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => {
            log_internal(&e);
            let email = match store.pending_email().await {
                Ok(Some(email)) => email.into_inner(),
                Ok(None) => return Redirect::to(LOGIN_PATH).into_response(),
                Err(e) => return AppError::from(e).into_response(),
            };

            (
                form_status(&e),
                OtpTemplate {
                    email,
                    error: Some(e.user_message()),
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Clear the admin session.
///
/// POST /admin/logout
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Response {
    if let Err(e) = SessionStore::new(session).clear().await {
        return AppError::from(e).into_response();
    }
    clear_sentry_user();
    tracing::info!("admin signed out");

    Redirect::to(LOGIN_PATH).into_response()
}
