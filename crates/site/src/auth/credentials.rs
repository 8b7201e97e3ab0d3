//! Credential submission: the first step of the handshake.

use portfolio_core::Email;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::error::{INVALID_CREDENTIALS, LOGIN_UNREACHABLE, MISSING_CREDENTIALS};
use super::{AuthApi, AuthError, AuthStage, SessionStore, Submission, SubmissionTracker};

/// Submit admin credentials to the backend.
///
/// On success the email is stored as the pending login (replacing any
/// earlier one) and returned; the caller moves the browser to the OTP form.
/// Empty fields are rejected before anything is sent.
///
/// # Errors
///
/// - `AuthError::Validation` for an empty or malformed field
/// - `AuthError::InFlight` if a sign-in for this email is still outstanding
/// - `AuthError::Rejected` with the backend's message, or a fallback
/// - `AuthError::Connectivity` if the backend cannot be reached
/// - `AuthError::Stale` if a newer submission superseded this one
/// - `AuthError::Session` if the session cannot be written
#[instrument(skip_all)]
pub async fn submit_credentials<A: AuthApi>(
    api: &A,
    tracker: &SubmissionTracker,
    store: &SessionStore,
    email: &str,
    password: &SecretString,
) -> Result<Email, AuthError> {
    let email = email.trim();
    if email.is_empty() || password.expose_secret().is_empty() {
        return Err(AuthError::Validation(MISSING_CREDENTIALS));
    }

    // A malformed address can never match an admin account.
    let email = Email::parse(email).map_err(|_| AuthError::Validation(INVALID_CREDENTIALS))?;

    let ticket = tracker.begin(Submission::Credentials, &email)?;
    tracing::debug!(
        stage = ?AuthStage::CredentialsPending,
        email = %email.masked(),
        request_id = ticket.id(),
        "submitting credentials"
    );

    let result = api.login(&email, password).await;
    tracker.finish(ticket)?;

    match result {
        Ok(()) => {
            store.set_pending_email(&email).await?;
            tracing::info!(
                stage = ?AuthStage::OtpPending,
                email = %email.masked(),
                "credentials accepted, awaiting OTP"
            );
            Ok(email)
        }
        Err(e) if e.is_connectivity() => {
            tracing::warn!(error = %e, "backend unreachable during sign-in");
            Err(AuthError::Connectivity(LOGIN_UNREACHABLE))
        }
        Err(e) => {
            tracing::info!(error = %e, email = %email.masked(), "credentials rejected");
            Err(AuthError::Rejected(
                e.backend_message().unwrap_or(INVALID_CREDENTIALS).to_string(),
            ))
        }
    }
}
