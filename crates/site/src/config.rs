//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SITE_API_BASE_URL` - Base URL of the portfolio REST backend (e.g., `http://localhost:9097`)
//!
//! ## Optional
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_BASE_URL` - Public URL of this site (default: `http://localhost:3000`)
//! - `SITE_BACKEND_TIMEOUT_SECS` - Timeout for every backend call (default: 10)
//! - `SITE_OTP_REDIRECT_DELAY_MS` - Delay before the OTP success page forwards to the dashboard (default: 1000)
//! - `SITE_RATE_LIMIT` - Rate limit sign-in submissions per client IP (default: true)
//! - `SITE_PROFILE_PATH` - YAML file with the portfolio page content (default: built-in profile)
//! - `SITE_STATIC_DIR` - Directory served under `/static` (default: crates/site/static)
//! - `SITE_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_OTP_REDIRECT_DELAY_MS: u64 = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Portfolio REST backend configuration
    pub backend: BackendConfig,
    /// Delay before the OTP success notification forwards to the dashboard
    pub otp_redirect_delay: Duration,
    /// Whether sign-in submissions are rate limited per client IP
    pub rate_limit: bool,
    /// Optional YAML file overriding the built-in profile content
    pub profile_path: Option<PathBuf>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Portfolio REST backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, without a trailing `/api`
    pub base_url: Url,
    /// Timeout applied to every request
    pub timeout: Duration,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env("SITE_HOST", "127.0.0.1")?;
        let port = parse_env("SITE_PORT", "3000")?;
        let base_url = get_env_or_default("SITE_BASE_URL", "http://localhost:3000");

        let backend = BackendConfig {
            base_url: parse_backend_url(&get_required_env("SITE_API_BASE_URL")?)?,
            timeout: Duration::from_secs(parse_env(
                "SITE_BACKEND_TIMEOUT_SECS",
                &DEFAULT_BACKEND_TIMEOUT_SECS.to_string(),
            )?),
        };

        let otp_redirect_delay = Duration::from_millis(parse_env(
            "SITE_OTP_REDIRECT_DELAY_MS",
            &DEFAULT_OTP_REDIRECT_DELAY_MS.to_string(),
        )?);

        let rate_limit = parse_bool("SITE_RATE_LIMIT", true)?;
        let profile_path = get_optional_env("SITE_PROFILE_PATH").map(PathBuf::from);
        let static_dir = PathBuf::from(get_env_or_default("SITE_STATIC_DIR", "crates/site/static"));
        let log_json = get_optional_env("SITE_LOG_JSON").is_some();

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            otp_redirect_delay,
            rate_limit,
            profile_path,
            static_dir,
            log_json,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration for tests and local tooling: everything defaulted except
    /// the backend URL.
    #[must_use]
    pub fn for_backend(base_url: Url) -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            backend: BackendConfig {
                base_url,
                timeout: Duration::from_secs(DEFAULT_BACKEND_TIMEOUT_SECS),
            },
            otp_redirect_delay: Duration::from_millis(DEFAULT_OTP_REDIRECT_DELAY_MS),
            rate_limit: false,
            profile_path: None,
            static_dir: PathBuf::from("crates/site/static"),
            log_json: false,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) with `FromStr`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
fn parse_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(default);
    };
    parse_bool_value(&value)
        .ok_or_else(|| ConfigError::InvalidEnvVar(key.to_string(), format!("not a boolean: {value}")))
}

fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse the backend base URL, stripping a trailing `/api` or `/`.
///
/// Endpoint paths always start with `/api/...`, so both
/// `http://host:9097` and `http://host:9097/api/` are accepted.
fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);

    let url = Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidEnvVar("SITE_API_BASE_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "SITE_API_BASE_URL".to_string(),
            format!("unsupported scheme: {}", url.scheme()),
        ));
    }

    Ok(url)
}
