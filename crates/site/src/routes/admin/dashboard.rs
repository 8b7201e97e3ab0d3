//! Admin dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use super::session_expired;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin_name: String,
    /// `None` when the backend could not be reached.
    pub project_count: Option<usize>,
    pub certification_count: Option<usize>,
}

/// Display the dashboard.
///
/// GET /admin
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
) -> Response {
    let (projects, certifications) = tokio::join!(
        state.backend().projects(),
        state.backend().certifications()
    );

    if projects.as_ref().is_err_and(|e| e.is_unauthorized())
        || certifications.as_ref().is_err_and(|e| e.is_unauthorized())
    {
        return session_expired(session).await;
    }

    let project_count = projects
        .inspect_err(|e| tracing::warn!(error = %e, "failed to count projects"))
        .ok()
        .map(|p| p.len());
    let certification_count = certifications
        .inspect_err(|e| tracing::warn!(error = %e, "failed to count certifications"))
        .ok()
        .map(|c| c.len());

    DashboardTemplate {
        admin_name: admin.greeting_name().to_string(),
        project_count,
        certification_count,
    }
    .into_response()
}
