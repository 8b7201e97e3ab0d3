//! Admin project management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use portfolio_core::ProjectId;
use tower_sessions::Session;
use tracing::instrument;

use super::{FlashQuery, MultipartForm, session_expired};
use crate::backend::{BackendError, Project, ProjectInput};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CurrentAdmin, RequireAdmin};
use crate::state::AppState;

const LIST_PATH: &str = "/admin/projects";
const TITLE_REQUIRED: &str = "Project title is required.";
const SAVE_FAILED: &str = "Failed to save project.";

// =============================================================================
// Templates
// =============================================================================

/// Project list.
#[derive(Template, WebTemplate)]
#[template(path = "admin/projects.html")]
pub struct ProjectListTemplate {
    pub admin_name: String,
    pub projects: Vec<Project>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// New/edit project form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/project_form.html")]
pub struct ProjectFormTemplate {
    pub admin_name: String,
    pub heading: &'static str,
    pub action: String,
    pub input: ProjectInput,
    /// Image currently stored for the project, when editing.
    pub current_image: Option<String>,
    pub error: Option<String>,
}

impl ProjectFormTemplate {
    fn new_project(admin: &CurrentAdmin) -> Self {
        Self {
            admin_name: admin.greeting_name().to_string(),
            heading: "Add Project",
            action: LIST_PATH.to_string(),
            input: ProjectInput::default(),
            current_image: None,
            error: None,
        }
    }

    fn edit_project(admin: &CurrentAdmin, id: ProjectId) -> Self {
        Self {
            heading: "Edit Project",
            action: format!("{LIST_PATH}/{id}"),
            ..Self::new_project(admin)
        }
    }

    fn with_error(self, status: StatusCode, error: String) -> Response {
        (status, Self { error: Some(error), ..self }).into_response()
    }
}

/// Build the write input from a submitted form.
fn project_input(form: MultipartForm) -> ProjectInput {
    ProjectInput {
        title: form.text("title"),
        description: form.text("description"),
        technologies: form.text("technologies"),
        live_url: form.text("live_url"),
        github_url: form.text("github_url"),
        image: form.image,
    }
}

/// Status and message for a failed backend write.
fn write_failure(err: &BackendError) -> (StatusCode, String) {
    tracing::warn!(error = %err, "project write failed");
    let status = if err.is_connectivity() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    };
    (
        status,
        err.backend_message().unwrap_or(SAVE_FAILED).to_string(),
    )
}

async fn find_project(state: &AppState, id: ProjectId) -> Result<Project> {
    state
        .backend()
        .projects()
        .await?
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::NotFound(format!("project {id}")))
}

// =============================================================================
// Handlers
// =============================================================================

/// List projects.
///
/// GET /admin/projects
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    let (projects, load_error) = match state.backend().projects().await {
        Ok(projects) => (projects, None),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load projects");
            (Vec::new(), Some("Failed to load projects.".to_string()))
        }
    };

    ProjectListTemplate {
        admin_name: admin.greeting_name().to_string(),
        projects,
        notice: flash.notice_text("Project"),
        error: load_error.or_else(|| flash.error_text("Project")),
    }
}

/// Display the new project form.
///
/// GET /admin/projects/new
pub async fn new(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
    ProjectFormTemplate::new_project(&admin)
}

/// Create a project.
///
/// POST /admin/projects
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let input = project_input(MultipartForm::read(multipart).await?);
    let form = ProjectFormTemplate {
        input: input.clone(),
        ..ProjectFormTemplate::new_project(&admin)
    };

    if input.title.is_empty() {
        return Ok(form.with_error(StatusCode::UNPROCESSABLE_ENTITY, TITLE_REQUIRED.to_string()));
    }

    match state.backend().create_project(&admin.token, &input).await {
        Ok(()) => {
            tracing::info!(title = %input.title, "project created");
            Ok(Redirect::to(&format!("{LIST_PATH}?notice=created")).into_response())
        }
        Err(e) if e.is_unauthorized() => Ok(session_expired(session).await),
        Err(e) => {
            let (status, message) = write_failure(&e);
            Ok(form.with_error(status, message))
        }
    }
}

/// Display the edit form for a project.
///
/// GET /admin/projects/{id}/edit
#[instrument(skip(state, admin))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProjectId>,
) -> Result<impl IntoResponse> {
    let project = find_project(&state, id).await?;

    Ok(ProjectFormTemplate {
        input: ProjectInput::from_project(&project),
        current_image: project.image_url.clone(),
        ..ProjectFormTemplate::edit_project(&admin, id)
    })
}

/// Update a project.
///
/// POST /admin/projects/{id}
#[instrument(skip(state, admin, session, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProjectId>,
    multipart: Multipart,
) -> Result<Response> {
    let input = project_input(MultipartForm::read(multipart).await?);
    let form = ProjectFormTemplate {
        input: input.clone(),
        ..ProjectFormTemplate::edit_project(&admin, id)
    };

    if input.title.is_empty() {
        return Ok(form.with_error(StatusCode::UNPROCESSABLE_ENTITY, TITLE_REQUIRED.to_string()));
    }

    match state.backend().update_project(&admin.token, id, &input).await {
        Ok(()) => {
            tracing::info!(%id, "project updated");
            Ok(Redirect::to(&format!("{LIST_PATH}?notice=updated")).into_response())
        }
        Err(e) if e.is_unauthorized() => Ok(session_expired(session).await),
        Err(e) => {
            let (status, message) = write_failure(&e);
            Ok(form.with_error(status, message))
        }
    }
}

/// Delete a project.
///
/// POST /admin/projects/{id}/delete
#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<ProjectId>,
) -> Response {
    match state.backend().delete_project(&admin.token, id).await {
        Ok(()) => {
            tracing::info!(%id, "project deleted");
            Redirect::to(&format!("{LIST_PATH}?notice=deleted")).into_response()
        }
        Err(e) if e.is_unauthorized() => session_expired(session).await,
        Err(e) => {
            tracing::warn!(error = %e, %id, "project delete failed");
            Redirect::to(&format!("{LIST_PATH}?error=delete_failed")).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_failure_prefers_backend_message() {
        let (status, message) = write_failure(&BackendError::Api {
            status: 400,
            message: Some("Image too large".to_string()),
        });
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(message, "Image too large");

        let (status, message) = write_failure(&BackendError::Timeout);
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(message, SAVE_FAILED);
    }
}
