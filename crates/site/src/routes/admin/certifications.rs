//! Admin certification management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use portfolio_core::CertificationId;
use tower_sessions::Session;
use tracing::instrument;

use super::{FlashQuery, MultipartForm, session_expired};
use crate::backend::{BackendError, Certification, CertificationInput};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{CurrentAdmin, RequireAdmin};
use crate::state::AppState;

const LIST_PATH: &str = "/admin/certifications";
const NAME_REQUIRED: &str = "Certification name is required.";
const SAVE_FAILED: &str = "Failed to save certification.";

/// Certification list.
#[derive(Template, WebTemplate)]
#[template(path = "admin/certifications.html")]
pub struct CertificationListTemplate {
    pub admin_name: String,
    pub certifications: Vec<Certification>,
    pub notice: Option<String>,
    pub error: Option<String>,
}

/// New/edit certification form.
#[derive(Template, WebTemplate)]
#[template(path = "admin/certification_form.html")]
pub struct CertificationFormTemplate {
    pub admin_name: String,
    pub heading: &'static str,
    pub action: String,
    pub input: CertificationInput,
    pub current_image: Option<String>,
    pub error: Option<String>,
}

impl CertificationFormTemplate {
    fn new_certification(admin: &CurrentAdmin) -> Self {
        Self {
            admin_name: admin.greeting_name().to_string(),
            heading: "Add Certification",
            action: LIST_PATH.to_string(),
            input: CertificationInput::default(),
            current_image: None,
            error: None,
        }
    }

    fn edit_certification(admin: &CurrentAdmin, id: CertificationId) -> Self {
        Self {
            heading: "Edit Certification",
            action: format!("{LIST_PATH}/{id}"),
            ..Self::new_certification(admin)
        }
    }

    fn with_error(self, status: StatusCode, error: String) -> Response {
        (status, Self { error: Some(error), ..self }).into_response()
    }
}

fn certification_input(form: MultipartForm) -> CertificationInput {
    CertificationInput {
        name: form.text("name"),
        issuer: form.text("issuer"),
        year: form.text("year"),
        description: form.text("description"),
        image: form.image,
    }
}

fn write_failure(err: &BackendError) -> (StatusCode, String) {
    tracing::warn!(error = %err, "certification write failed");
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

async fn find_certification(state: &AppState, id: CertificationId) -> Result<Certification> {
    state
        .backend()
        .certifications()
        .await?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| AppError::NotFound(format!("certification {id}")))
}

/// List certifications.
///
/// GET /admin/certifications
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Query(flash): Query<FlashQuery>,
) -> impl IntoResponse {
    let (certifications, load_error) = match state.backend().certifications().await {
        Ok(certifications) => (certifications, None),
        Err(e) => {
            tracing::warn!(error = %e, "failed to load certifications");
            (Vec::new(), Some("Failed to load certifications.".to_string()))
        }
    };

    CertificationListTemplate {
        admin_name: admin.greeting_name().to_string(),
        certifications,
        notice: flash.notice_text("Certification"),
        error: load_error.or_else(|| flash.error_text("Certification")),
    }
}

/// GET /admin/certifications/new
pub async fn new(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
    CertificationFormTemplate::new_certification(&admin)
}

/// Create a certification.
///
/// POST /admin/certifications
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    multipart: Multipart,
) -> Result<Response> {
    let input = certification_input(MultipartForm::read(multipart).await?);
    let form = CertificationFormTemplate {
        input: input.clone(),
        ..CertificationFormTemplate::new_certification(&admin)
    };

    if input.name.is_empty() {
        return Ok(form.with_error(StatusCode::UNPROCESSABLE_ENTITY, NAME_REQUIRED.to_string()));
    }

    match state
        .backend()
        .create_certification(&admin.token, &input)
        .await
    {
        Ok(()) => {
            tracing::info!(name = %input.name, "certification created");
            Ok(Redirect::to(&format!("{LIST_PATH}?notice=created")).into_response())
        }
        Err(e) if e.is_unauthorized() => Ok(session_expired(session).await),
        Err(e) => {
            let (status, message) = write_failure(&e);
            Ok(form.with_error(status, message))
        }
    }
}

/// GET /admin/certifications/{id}/edit
#[instrument(skip(state, admin))]
pub async fn edit(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CertificationId>,
) -> Result<impl IntoResponse> {
    let cert = find_certification(&state, id).await?;

    Ok(CertificationFormTemplate {
        input: CertificationInput::from_certification(&cert),
        current_image: cert.image_url.clone(),
        ..CertificationFormTemplate::edit_certification(&admin, id)
    })
}

/// Update a certification.
///
/// POST /admin/certifications/{id}
#[instrument(skip(state, admin, session, multipart))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<CertificationId>,
    multipart: Multipart,
) -> Result<Response> {
    let input = certification_input(MultipartForm::read(multipart).await?);
    let form = CertificationFormTemplate {
        input: input.clone(),
        ..CertificationFormTemplate::edit_certification(&admin, id)
    };

    if input.name.is_empty() {
        return Ok(form.with_error(StatusCode::UNPROCESSABLE_ENTITY, NAME_REQUIRED.to_string()));
    }

    match state
        .backend()
        .update_certification(&admin.token, id, &input)
        .await
    {
        Ok(()) => {
            tracing::info!(%id, "certification updated");
            Ok(Redirect::to(&format!("{LIST_PATH}?notice=updated")).into_response())
        }
        Err(e) if e.is_unauthorized() => Ok(session_expired(session).await),
        Err(e) => {
            let (status, message) = write_failure(&e);
            Ok(form.with_error(status, message))
        }
    }
}

/// Delete a certification.
///
/// POST /admin/certifications/{id}/delete
#[instrument(skip(state, admin, session))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
    Path(id): Path<CertificationId>,
) -> Response {
    match state.backend().delete_certification(&admin.token, id).await {
        Ok(()) => {
            tracing::info!(%id, "certification deleted");
            Redirect::to(&format!("{LIST_PATH}?notice=deleted")).into_response()
        }
        Err(e) if e.is_unauthorized() => session_expired(session).await,
        Err(e) => {
            tracing::warn!(error = %e, %id, "certification delete failed");
            Redirect::to(&format!("{LIST_PATH}?error=delete_failed")).into_response()
        }
    }
}
