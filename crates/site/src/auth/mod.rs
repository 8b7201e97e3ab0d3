//! Admin authentication handshake.
//!
//! Signing in takes two round trips to the backend:
//!
//! ```text
//! Anonymous --submit credentials--> CredentialsPending
//!     --2xx--> OtpPending(email)          (pending email stored)
//!     --error--> Anonymous                (message shown)
//! OtpPending --submit 6-digit code-->
//!     --2xx with token--> Authenticated   (token stored, pending email cleared)
//!     --error--> OtpPending               (message shown, retry allowed)
//! Authenticated --logout--> Anonymous
//! ```
//!
//! The browser-side state lives in the session ([`SessionStore`]); in-flight
//! requests are tracked across sessions by [`SubmissionTracker`].

mod credentials;
mod error;
mod otp;
mod session_store;
mod tracker;

pub use credentials::submit_credentials;
pub use error::{
    AuthError, INVALID_CREDENTIALS, INVALID_OTP_FORMAT, LOGIN_UNREACHABLE, MISSING_CREDENTIALS,
    OTP_REJECTED, OTP_UNREACHABLE, OTP_VERIFIED,
};
pub use otp::{OtpConfirmed, confirm_otp};
pub use session_store::{SessionStore, keys as session_keys};
pub use tracker::{SubmissionTracker, Ticket};

use std::future::Future;

use portfolio_core::{Email, OtpCode};
use secrecy::SecretString;

use crate::backend::{BackendClient, BackendError, OtpVerification};

/// Where a browser is in the sign-in handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    /// Nothing submitted yet, or logged out.
    Anonymous,
    /// Credentials are with the backend; only exists for the duration of
    /// the request.
    CredentialsPending,
    /// Credentials accepted; waiting for the one-time code.
    OtpPending,
    /// Code confirmed and token stored.
    Authenticated,
}

/// A backend round trip that can be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Submission {
    /// `POST /api/admin/login`
    Credentials,
    /// `POST /api/admin/verify-otp`
    Otp,
}

impl Submission {
    /// Label used in user-facing messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Credentials => "A sign-in",
            Self::Otp => "A verification",
        }
    }
}

/// The backend calls the handshake depends on.
pub trait AuthApi: Send + Sync {
    /// Submit credentials; `Ok` means a code was sent.
    fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Verify a one-time code.
    fn verify_otp(
        &self,
        email: &Email,
        otp: &OtpCode,
    ) -> impl Future<Output = Result<OtpVerification, BackendError>> + Send;
}

impl AuthApi for BackendClient {
    fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), BackendError>> + Send {
        Self::login(self, email, password)
    }

    fn verify_otp(
        &self,
        email: &Email,
        otp: &OtpCode,
    ) -> impl Future<Output = Result<OtpVerification, BackendError>> + Send {
        Self::verify_otp(self, email, otp)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! A scripted [`AuthApi`] that counts its calls.

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Scripted outcome of a fake backend call.
    pub enum Reply {
        Ok,
        Verified(OtpVerification),
        Status(u16, Option<&'static str>),
        Unreachable,
    }

    impl Reply {
        fn into_error(self) -> BackendError {
            match self {
                Self::Status(status, message) => BackendError::Api {
                    status,
                    message: message.map(str::to_string),
                },
                _ => BackendError::Timeout,
            }
        }
    }

    #[derive(Default)]
    pub struct FakeBackend {
        replies: Mutex<VecDeque<Reply>>,
        delay: Option<Duration>,
        pub login_calls: AtomicUsize,
        pub verify_calls: AtomicUsize,
        pub last_otp: Mutex<Option<String>>,
    }

    impl FakeBackend {
        pub fn replying(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                ..Self::default()
            }
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> usize {
            self.login_calls.load(Ordering::SeqCst) + self.verify_calls.load(Ordering::SeqCst)
        }

        fn next(&self) -> Reply {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Reply::Unreachable)
        }

        async fn pause(&self) {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    impl AuthApi for FakeBackend {
        async fn login(&self, _email: &Email, _password: &SecretString) -> Result<(), BackendError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            self.pause().await;
            match self.next() {
                Reply::Ok | Reply::Verified(_) => Ok(()),
                other => Err(other.into_error()),
            }
        }

        async fn verify_otp(
            &self,
            _email: &Email,
            otp: &OtpCode,
        ) -> Result<OtpVerification, BackendError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_otp.lock().unwrap() = Some(otp.as_str().to_string());
            self.pause().await;
            match self.next() {
                Reply::Verified(body) => Ok(body),
                Reply::Ok => Ok(OtpVerification::default()),
                other => Err(other.into_error()),
            }
        }
    }

    pub fn tracker() -> SubmissionTracker {
        SubmissionTracker::new(Duration::from_secs(60))
    }
}
