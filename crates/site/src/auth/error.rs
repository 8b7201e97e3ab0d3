//! Admin authentication error types.

use thiserror::Error;

use super::Submission;

/// Shown when the credential form is submitted with an empty field.
pub const MISSING_CREDENTIALS: &str = "Please enter both Email ID and Password.";
/// Fallback when the backend rejects credentials without a message.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
/// Shown when the backend cannot be reached during sign-in.
pub const LOGIN_UNREACHABLE: &str =
    "Failed to connect to the server. Please check if the backend is running.";
/// Shown when the code is not exactly six digits.
pub const INVALID_OTP_FORMAT: &str = "Please enter a valid 6-digit OTP.";
/// Fallback when the backend rejects a code without a message.
pub const OTP_REJECTED: &str = "The OTP you entered is incorrect or expired.";
/// Shown when the backend cannot be reached during code verification.
pub const OTP_UNREACHABLE: &str = "Failed to connect to the server. Please try again.";
/// Notification shown after a successful code verification.
pub const OTP_VERIFIED: &str = "OTP verified successfully";

/// Errors that can occur during the admin sign-in handshake.
///
/// Every variant has a message fit to show on the form that caused it; see
/// [`AuthError::user_message`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed local validation; the backend was not called.
    #[error("{0}")]
    Validation(&'static str),

    /// The backend answered with a refusal.
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached or timed out.
    #[error("{0}")]
    Connectivity(&'static str),

    /// An identical submission is still waiting for the backend.
    #[error("{} request is already in progress.", .0.label())]
    InFlight(Submission),

    /// The OTP stage was entered without a pending login.
    #[error("Please sign in first.")]
    NoPendingLogin,

    /// A newer submission superseded this one before its response arrived.
    #[error("This request was superseded by a newer one. Please try again.")]
    Stale,

    /// Authentication was requested without a session token.
    #[error("no session token has been issued")]
    MissingToken,

    /// The session could not be read or written.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AuthError {
    /// Message to render next to the form.
    ///
    /// Internal failures get a generic message; their details go to the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingToken | Self::Session(_) => {
                "Something went wrong. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether this error is a server-side fault rather than a user or
    /// backend outcome.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::MissingToken | Self::Session(_))
    }
}
