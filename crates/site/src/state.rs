//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::SubmissionTracker;
use crate::backend::{BackendClient, BackendError};
use crate::config::SiteConfig;
use crate::profile::Profile;

/// Grace period added to the backend timeout before an in-flight
/// submission is forgotten.
const TRACKER_GRACE: Duration = Duration::from_secs(1);

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    backend: BackendClient,
    tracker: SubmissionTracker,
    profile: Profile,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend HTTP client cannot be built.
    pub fn new(config: SiteConfig, profile: Profile) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let tracker = SubmissionTracker::new(config.backend.timeout + TRACKER_GRACE);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                tracker,
                profile,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the backend client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the in-flight submission tracker.
    #[must_use]
    pub fn tracker(&self) -> &SubmissionTracker {
        &self.inner.tracker
    }

    /// Get a reference to the portfolio page content.
    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.inner.profile
    }
}
