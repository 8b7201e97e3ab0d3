//! Session middleware configuration.
//!
//! Sessions live in process memory: they only carry the admin handshake
//! state, and a restart simply signs the admin out.
//!
//! `MemoryStore` never deletes expired records; it only refuses to load
//! them. Sign-out and backend rejections flush the record, but a session
//! that is simply abandoned stays in memory until the process restarts.
//! Records are small and only created once a handler writes to the session,
//! so this is bounded by sign-in attempts.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::SiteConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "portfolio_admin_session";

/// Session inactivity expiry in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &SiteConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
