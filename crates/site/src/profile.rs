//! Static content of the public portfolio page.
//!
//! Projects and certifications come from the backend; everything else on the
//! page (hero, about, education, contact details) is described by a YAML
//! profile. A default profile is compiled in; `SITE_PROFILE_PATH` replaces it.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

/// Profile compiled into the binary.
const BUILTIN_PROFILE: &str = include_str!("../content/profile.yaml");

/// Errors that can occur while loading the profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read profile: {0}")]
    Io(String),
    #[error("failed to parse profile: {0}")]
    Parse(String),
}

/// Portfolio page content.
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub name: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    pub headline: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub hero_skills: Vec<String>,
    /// About section, one entry per paragraph.
    #[serde(default)]
    pub about: Vec<String>,
    #[serde(default)]
    pub technical_skills: Vec<String>,
    #[serde(default)]
    pub creative_skills: Vec<String>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub education: Vec<Education>,
    pub contact: ContactDetails,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
}

/// An entry of the "What I Do" list.
#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub title: String,
    pub description: String,
}

/// A school or degree.
#[derive(Debug, Clone, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub period: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Public contact details.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A link to a profile elsewhere.
#[derive(Debug, Clone, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

fn default_greeting() -> String {
    "Hello, I'm".to_string()
}

impl Profile {
    /// The compiled-in profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Parse` if the bundled YAML is invalid.
    pub fn builtin() -> Result<Self, ProfileError> {
        Self::from_yaml(BUILTIN_PROFILE)
    }

    /// Parse a profile from YAML.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Parse` if the YAML does not describe a profile.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        serde_yaml::from_str(yaml).map_err(|e| ProfileError::Parse(e.to_string()))
    }

    /// Load the profile from `path`, or the built-in one when no path is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument]
    pub async fn load(path: Option<&Path>) -> Result<Self, ProfileError> {
        let Some(path) = path else {
            return Self::builtin();
        };

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ProfileError::Io(format!("{}: {e}", path.display())))?;

        let profile = Self::from_yaml(&content)?;
        tracing::info!(name = %profile.name, "loaded profile");
        Ok(profile)
    }

    /// First letter of the name, for the avatar fallback.
    #[must_use]
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}
