//! Per-browser admin session state.

use portfolio_core::Email;
use secrecy::SecretString;
use tower_sessions::Session;

use super::{AuthError, AuthStage};

/// Session keys for admin authentication data.
pub mod keys {
    /// Email awaiting OTP confirmation.
    pub const PENDING_EMAIL: &str = "admin_pending_email";

    /// Bearer token issued by the backend.
    pub const AUTH_TOKEN: &str = "admin_auth_token";

    /// Set once the OTP has been confirmed.
    pub const AUTHENTICATED: &str = "admin_authenticated";

    /// Display name returned with the token, if any.
    pub const DISPLAY_NAME: &str = "admin_name";
}

/// Typed view over the admin keys of a browser session.
///
/// Invariant: the authenticated flag is only ever stored alongside a
/// non-empty token.
#[derive(Clone)]
pub struct SessionStore {
    session: Session,
}

impl SessionStore {
    /// Wrap the session injected by the session layer.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// The underlying session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    // =========================================================================
    // Pending Login
    // =========================================================================

    /// Record the email awaiting OTP confirmation, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be written.
    pub async fn set_pending_email(&self, email: &Email) -> Result<(), AuthError> {
        self.session.insert(keys::PENDING_EMAIL, email).await?;
        Ok(())
    }

    /// Email awaiting OTP confirmation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read.
    pub async fn pending_email(&self) -> Result<Option<Email>, AuthError> {
        Ok(self.session.get(keys::PENDING_EMAIL).await?)
    }

    /// Forget the pending login.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be written.
    pub async fn clear_pending_email(&self) -> Result<(), AuthError> {
        self.session.remove_value(keys::PENDING_EMAIL).await?;
        Ok(())
    }

    // =========================================================================
    // Authenticated Session
    // =========================================================================

    /// Store the backend token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` for an empty token, or
    /// `AuthError::Session` if the session cannot be written.
    pub async fn set_token(&self, token: &str) -> Result<(), AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.session.insert(keys::AUTH_TOKEN, token).await?;
        Ok(())
    }

    /// The stored backend token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read.
    pub async fn token(&self) -> Result<Option<SecretString>, AuthError> {
        let token: Option<String> = self.session.get(keys::AUTH_TOKEN).await?;
        Ok(token
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from))
    }

    /// Set or clear the authenticated flag.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingToken` when asked to set the flag without a
    /// stored token, or `AuthError::Session` if the session cannot be written.
    pub async fn set_authenticated(&self, authenticated: bool) -> Result<(), AuthError> {
        if !authenticated {
            self.session.remove_value(keys::AUTHENTICATED).await?;
            return Ok(());
        }

        if self.token().await?.is_none() {
            return Err(AuthError::MissingToken);
        }
        self.session.insert(keys::AUTHENTICATED, true).await?;
        Ok(())
    }

    /// Whether the session holds a confirmed login with a token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read.
    pub async fn is_authenticated(&self) -> Result<bool, AuthError> {
        let flag: Option<bool> = self.session.get(keys::AUTHENTICATED).await?;
        if flag != Some(true) {
            return Ok(false);
        }
        Ok(self.token().await?.is_some())
    }

    /// Store the display name; `None` or a blank name removes it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be written.
    pub async fn set_display_name(&self, name: Option<&str>) -> Result<(), AuthError> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => self.session.insert(keys::DISPLAY_NAME, name).await?,
            None => {
                self.session.remove_value(keys::DISPLAY_NAME).await?;
            }
        }
        Ok(())
    }

    /// The stored display name.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read.
    pub async fn display_name(&self) -> Result<Option<String>, AuthError> {
        Ok(self.session.get(keys::DISPLAY_NAME).await?)
    }

    /// Give the session a fresh id, keeping its data.
    ///
    /// Called when the session is elevated to an authenticated one, so a
    /// session id obtained before sign-in cannot be reused afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the old record cannot be deleted.
    pub async fn renew_id(&self) -> Result<(), AuthError> {
        self.session.cycle_id().await?;
        Ok(())
    }

    /// Remove the token, flag, display name and any pending login.
    ///
    /// The whole session is flushed, so its record is deleted from the store
    /// rather than left behind empty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be deleted.
    pub async fn clear(&self) -> Result<(), AuthError> {
        self.session.flush().await?;
        Ok(())
    }

    /// Current handshake stage as recorded in the session.
    ///
    /// `CredentialsPending` is never returned: it only exists while a login
    /// request is in flight and is not persisted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be read.
    pub async fn stage(&self) -> Result<AuthStage, AuthError> {
        if self.is_authenticated().await? {
            return Ok(AuthStage::Authenticated);
        }
        if self.pending_email().await?.is_some() {
            return Ok(AuthStage::OtpPending);
        }
        Ok(AuthStage::Anonymous)
    }
}
