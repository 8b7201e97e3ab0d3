//! Public portfolio page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::backend::{Certification, Project};
use crate::filters;
use crate::profile::Profile;
use crate::state::AppState;

/// Portfolio page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate<'a> {
    pub profile: &'a Profile,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    /// Projects could not be loaded from the backend.
    pub projects_unavailable: bool,
    /// Certifications could not be loaded from the backend.
    pub certifications_unavailable: bool,
}

/// Display the portfolio page.
///
/// Projects and certifications are fetched concurrently; if the backend is
/// down the page still renders with those sections marked unavailable.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let (projects, certifications) = tokio::join!(
        state.backend().projects(),
        state.backend().certifications()
    );

    let projects_unavailable = projects.is_err();
    let projects = projects.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load projects");
        Vec::new()
    });

    let certifications_unavailable = certifications.is_err();
    let certifications = certifications.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load certifications");
        Vec::new()
    });

    HomeTemplate {
        profile: state.profile(),
        projects,
        certifications,
        projects_unavailable,
        certifications_unavailable,
    }
    .into_response()
}
