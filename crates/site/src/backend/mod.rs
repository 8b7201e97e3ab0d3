//! Portfolio REST backend client.
//!
//! The backend owns all persistent data (projects, certifications, admin
//! accounts, one-time codes). This module is a thin, typed wrapper around its
//! HTTP endpoints:
//!
//! ```text
//! POST   /api/admin/login                          {email, password}
//! POST   /api/admin/verify-otp                     {email, otp} -> {token, name?}
//! GET    /api/portfolio/projects                   -> [Project]
//! GET    /api/portfolio/certifications             -> [Certification]
//! POST   /api/portfolio/admin/projects             multipart, Bearer
//! PUT    /api/portfolio/admin/projects/{id}        multipart, Bearer
//! DELETE /api/portfolio/admin/projects/{id}        Bearer
//! POST   /api/portfolio/admin/certifications       multipart, Bearer
//! PUT    /api/portfolio/admin/certifications/{id}  multipart, Bearer
//! DELETE /api/portfolio/admin/certifications/{id}  Bearer
//! POST   /api/contact/send                         {name, email, subject, message}
//! ```

mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{
    Certification, CertificationInput, ContactMessage, ImageUpload, OtpVerification, Project,
    ProjectInput,
};

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request could not be completed (connection refused, DNS, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {}", message.as_deref().unwrap_or("<no message>"))]
    Api {
        /// HTTP status code.
        status: u16,
        /// `message` field of the JSON error body, if there was one.
        message: Option<String>,
    },

    /// A success response did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Whether the backend could not be reached at all.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout)
    }

    /// Whether the backend rejected the session token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// The message the backend supplied, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
