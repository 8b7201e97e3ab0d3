//! Request and response types for the portfolio backend.

use portfolio_core::{CertificationId, Email, OtpCode, ProjectId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Image shown when an entity has no uploaded image.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder.svg";

// =============================================================================
// Portfolio Entities
// =============================================================================

/// A portfolio project as returned by `GET /api/portfolio/projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Comma-separated technology names.
    #[serde(default)]
    pub technologies: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub github_url: Option<String>,
}

impl Project {
    /// Technology names, trimmed, with empty entries dropped.
    #[must_use]
    pub fn technology_list(&self) -> Vec<&str> {
        split_technologies(self.technologies.as_deref().unwrap_or_default())
    }

    /// Image URL to render, falling back to the placeholder.
    #[must_use]
    pub fn image_src(&self) -> &str {
        non_empty(self.image_url.as_deref()).unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// A certification as returned by `GET /api/portfolio/certifications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: CertificationId,
    pub name: String,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Certification {
    /// Image URL to render, falling back to the placeholder.
    #[must_use]
    pub fn image_src(&self) -> &str {
        non_empty(self.image_url.as_deref()).unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Split a comma-separated technology string.
#[must_use]
pub fn split_technologies(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(str::trim)
        .filter(|tech| !tech.is_empty())
        .collect()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Admin Write Inputs (sent as multipart forms)
// =============================================================================

/// An image file forwarded from the admin form to the backend.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Fields of the project create/update form.
#[derive(Debug, Clone, Default)]
pub struct ProjectInput {
    pub title: String,
    pub description: String,
    pub technologies: String,
    pub live_url: String,
    pub github_url: String,
    pub image: Option<ImageUpload>,
}

impl ProjectInput {
    /// Pre-fill the edit form from an existing project (no image re-upload).
    #[must_use]
    pub fn from_project(project: &Project) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone().unwrap_or_default(),
            technologies: project.technologies.clone().unwrap_or_default(),
            live_url: project.live_url.clone().unwrap_or_default(),
            github_url: project.github_url.clone().unwrap_or_default(),
            image: None,
        }
    }

    /// Multipart text fields, named the way the backend expects them.
    pub(super) fn text_fields(&self) -> [(&'static str, &str); 5] {
        [
            ("title", &self.title),
            ("description", &self.description),
            ("technologies", &self.technologies),
            ("liveUrl", &self.live_url),
            ("githubUrl", &self.github_url),
        ]
    }
}

/// Fields of the certification create/update form.
#[derive(Debug, Clone, Default)]
pub struct CertificationInput {
    pub name: String,
    pub issuer: String,
    pub year: String,
    pub description: String,
    pub image: Option<ImageUpload>,
}

impl CertificationInput {
    /// Pre-fill the edit form from an existing certification.
    #[must_use]
    pub fn from_certification(cert: &Certification) -> Self {
        Self {
            name: cert.name.clone(),
            issuer: cert.issuer.clone().unwrap_or_default(),
            year: cert.year.clone().unwrap_or_default(),
            description: cert.description.clone().unwrap_or_default(),
            image: None,
        }
    }

    pub(super) fn text_fields(&self) -> [(&'static str, &str); 4] {
        [
            ("name", &self.name),
            ("issuer", &self.issuer),
            ("year", &self.year),
            ("description", &self.description),
        ]
    }
}

// =============================================================================
// Contact
// =============================================================================

/// Contact form message forwarded to `POST /api/contact/send`.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub subject: String,
    pub message: String,
}

// =============================================================================
// Admin Authentication
// =============================================================================

/// Body of `POST /api/admin/login`.
#[derive(Serialize)]
pub(super) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

impl<'a> LoginRequest<'a> {
    pub(super) fn new(email: &'a Email, password: &'a SecretString) -> Self {
        Self {
            email: email.as_str(),
            password: password.expose_secret(),
        }
    }
}

/// Body of `POST /api/admin/verify-otp`.
#[derive(Serialize)]
pub(super) struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
}

impl<'a> VerifyOtpRequest<'a> {
    pub(super) fn new(email: &'a Email, otp: &'a OtpCode) -> Self {
        Self {
            email: email.as_str(),
            otp: otp.as_str(),
        }
    }
}

/// Body returned by a successful `POST /api/admin/verify-otp`.
///
/// Every field is optional: whether a 2xx answer actually carries a token is
/// decided by the OTP confirmer, not by deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct OtpVerification {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// JSON error body (`{"message": "..."}`) used by every backend endpoint.
#[derive(Debug, Default, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
