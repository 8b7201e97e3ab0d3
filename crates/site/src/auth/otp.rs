//! One-time code confirmation: the second step of the handshake.

use portfolio_core::{Email, OtpCode};
use tracing::instrument;

use super::error::{INVALID_OTP_FORMAT, OTP_REJECTED, OTP_UNREACHABLE};
use super::{AuthApi, AuthError, AuthStage, SessionStore, Submission, SubmissionTracker};

/// Outcome of a successful confirmation.
#[derive(Debug, Clone)]
pub struct OtpConfirmed {
    /// The email that is now signed in.
    pub email: Email,
    /// Display name returned by the backend, if any.
    pub display_name: Option<String>,
}

/// Confirm the one-time code for the session's pending login.
///
/// Success requires a 2xx answer that carries a non-empty token. The token,
/// authenticated flag and display name are then stored and the pending login
/// is cleared. On any failure the pending login is kept so the code can be
/// re-entered.
///
/// # Errors
///
/// - `AuthError::NoPendingLogin` if no credentials were accepted first
/// - `AuthError::Validation` unless the code is exactly six digits
/// - `AuthError::InFlight` if a verification for this email is outstanding
/// - `AuthError::Rejected` with the backend's message, or a fallback
/// - `AuthError::Connectivity` if the backend cannot be reached
/// - `AuthError::Stale` if a newer submission superseded this one
/// - `AuthError::Session` if the session cannot be read or written
#[instrument(skip_all)]
pub async fn confirm_otp<A: AuthApi>(
    api: &A,
    tracker: &SubmissionTracker,
    store: &SessionStore,
    code: &str,
) -> Result<OtpConfirmed, AuthError> {
    let email = store
        .pending_email()
        .await?
        .ok_or(AuthError::NoPendingLogin)?;

    let otp = OtpCode::parse(code).map_err(|_| AuthError::Validation(INVALID_OTP_FORMAT))?;

    let ticket = tracker.begin(Submission::Otp, &email)?;
    tracing::debug!(
        email = %email.masked(),
        request_id = ticket.id(),
        "verifying OTP"
    );

    let result = api.verify_otp(&email, &otp).await;
    tracker.finish(ticket)?;

    let verification = match result {
        Ok(verification) => verification,
        Err(e) if e.is_connectivity() => {
            tracing::warn!(error = %e, "backend unreachable during OTP verification");
            return Err(AuthError::Connectivity(OTP_UNREACHABLE));
        }
        Err(e) => {
            tracing::info!(error = %e, email = %email.masked(), "OTP rejected");
            return Err(AuthError::Rejected(
                e.backend_message().unwrap_or(OTP_REJECTED).to_string(),
            ));
        }
    };

    let Some(token) = verification.token.filter(|t| !t.trim().is_empty()) else {
        tracing::warn!(
            email = %email.masked(),
            "backend contract: verify-otp returned success without a token"
        );
        return Err(AuthError::Rejected(
            verification
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| OTP_REJECTED.to_string()),
        ));
    };

    store.renew_id().await?;
    store.set_token(&token).await?;
    store
        .set_display_name(verification.name.as_deref())
        .await?;
    store.set_authenticated(true).await?;
    store.clear_pending_email().await?;

    tracing::info!(
        stage = ?AuthStage::Authenticated,
        email = %email.masked(),
        "admin signed in"
    );

    Ok(OtpConfirmed {
        email,
        display_name: store.display_name().await?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::auth::session_store::tests::memory_session;
    use crate::auth::testing::{FakeBackend, Reply, tracker};
    use crate::backend::OtpVerification;

    async fn pending_store(email: &str) -> SessionStore {
        let store = SessionStore::new(memory_session());
        store
            .set_pending_email(&Email::parse(email).unwrap())
            .await
            .unwrap();
        store
    }

    fn verified(token: Option<&str>, name: Option<&str>) -> Reply {
        Reply::Verified(OtpVerification {
            token: token.map(str::to_string),
            name: name.map(str::to_string),
            message: None,
        })
    }

    #[tokio::test]
    async fn test_without_pending_login() {
        let api = FakeBackend::replying([verified(Some("abc"), None)]);
        let store = SessionStore::new(memory_session());

        let err = confirm_otp(&api, &tracker(), &store, "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoPendingLogin));
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_codes_skip_backend() {
        let api = FakeBackend::replying([verified(Some("abc"), None)]);
        let store = pending_store("a@b.com").await;
        let tracker = tracker();

        for code in ["", "12345", "1234567", "12a456", "abcdef"] {
            let err = confirm_otp(&api, &tracker, &store, code).await.unwrap_err();
            assert!(
                matches!(err, AuthError::Validation(INVALID_OTP_FORMAT)),
                "{code:?} should fail validation"
            );
        }

        assert_eq!(api.calls(), 0);
        assert_eq!(store.stage().await.unwrap(), AuthStage::OtpPending);
    }

    #[tokio::test]
    async fn test_success_persists_session() {
        let api = FakeBackend::replying([verified(Some("abc"), Some("X"))]);
        let store = pending_store("a@b.com").await;

        let confirmed = confirm_otp(&api, &tracker(), &store, " 123456 ")
            .await
            .unwrap();

        assert_eq!(confirmed.email.as_str(), "a@b.com");
        assert_eq!(confirmed.display_name.as_deref(), Some("X"));
        assert!(store.is_authenticated().await.unwrap());
        assert_eq!(store.token().await.unwrap().unwrap().expose_secret(), "abc");
        assert_eq!(store.display_name().await.unwrap().as_deref(), Some("X"));
        assert!(store.pending_email().await.unwrap().is_none());
        assert_eq!(api.last_otp.lock().unwrap().as_deref(), Some("123456"));
    }

    #[tokio::test]
    async fn test_success_without_token_is_failure() {
        let api = FakeBackend::replying([verified(None, Some("X")), verified(Some(""), None)]);
        let store = pending_store("a@b.com").await;
        let tracker = tracker();

        for _ in 0..2 {
            let err = confirm_otp(&api, &tracker, &store, "123456")
                .await
                .unwrap_err();
            assert_eq!(err.user_message(), OTP_REJECTED);
        }

        assert!(!store.is_authenticated().await.unwrap());
        assert_eq!(store.stage().await.unwrap(), AuthStage::OtpPending);
    }

    #[tokio::test]
    async fn test_rejection_keeps_pending_login() {
        let api = FakeBackend::replying([Reply::Status(401, Some("expired")), Reply::Status(400, None)]);
        let store = pending_store("a@b.com").await;
        let tracker = tracker();

        let err = confirm_otp(&api, &tracker, &store, "000000")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "expired");

        let err = confirm_otp(&api, &tracker, &store, "000000")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), OTP_REJECTED);

        assert_eq!(
            store.pending_email().await.unwrap().unwrap().as_str(),
            "a@b.com"
        );
        assert!(store.token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let api = FakeBackend::replying([Reply::Unreachable]);
        let store = pending_store("a@b.com").await;

        let err = confirm_otp(&api, &tracker(), &store, "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Connectivity(OTP_UNREACHABLE)));
        assert_eq!(store.stage().await.unwrap(), AuthStage::OtpPending);
    }

    #[tokio::test]
    async fn test_full_handshake() {
        use secrecy::SecretString;

        use crate::auth::submit_credentials;

        let api = FakeBackend::replying([Reply::Ok, verified(Some("tok1"), None)]);
        let store = SessionStore::new(memory_session());
        let tracker = tracker();

        submit_credentials(
            &api,
            &tracker,
            &store,
            "a@b.com",
            &SecretString::from("x".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(store.stage().await.unwrap(), AuthStage::OtpPending);

        confirm_otp(&api, &tracker, &store, "123456").await.unwrap();
        assert_eq!(store.stage().await.unwrap(), AuthStage::Authenticated);
        assert_eq!(store.token().await.unwrap().unwrap().expose_secret(), "tok1");
        assert_eq!(store.display_name().await.unwrap(), None);
    }
}
