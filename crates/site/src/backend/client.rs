//! HTTP client for the portfolio backend.

use std::sync::Arc;

use portfolio_core::{CertificationId, Email, OtpCode, ProjectId};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;

use super::BackendError;
use super::types::{
    Certification, CertificationInput, ContactMessage, ErrorBody, ImageUpload, LoginRequest,
    OtpVerification, Project, ProjectInput, VerifyOtpRequest,
};
use crate::config::BackendConfig;

/// Portfolio backend API client.
///
/// Cheap to clone; all clones share one connection pool. Every request is
/// bounded by the configured timeout so a hung backend surfaces as
/// [`BackendError::Timeout`] instead of a request that never finishes.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    // =========================================================================
    // Admin Authentication
    // =========================================================================

    /// Submit admin credentials. Success means a one-time code was sent.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` if the backend rejects the credentials,
    /// or a connectivity error if it cannot be reached.
    #[instrument(skip(self, password), fields(email = %email.masked()))]
    pub async fn login(&self, email: &Email, password: &SecretString) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/admin/login"))
            .json(&LoginRequest::new(email, password))
            .send()
            .await
            .map_err(map_send_error)?;

        ensure_success(response).await?;
        Ok(())
    }

    /// Verify a one-time code for the pending email.
    ///
    /// A 2xx answer is returned as-is, even without a token; deciding whether
    /// that counts as success is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Api` for non-2xx answers, or a connectivity
    /// error if the backend cannot be reached.
    #[instrument(skip(self, otp), fields(email = %email.masked()))]
    pub async fn verify_otp(
        &self,
        email: &Email,
        otp: &OtpCode,
    ) -> Result<OtpVerification, BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/admin/verify-otp"))
            .json(&VerifyOtpRequest::new(email, otp))
            .send()
            .await
            .map_err(map_send_error)?;

        let response = ensure_success(response).await?;
        let body = response.text().await.map_err(map_send_error)?;

        Ok(serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "verify-otp returned a non-JSON success body");
            OtpVerification::default()
        }))
    }

    // =========================================================================
    // Public Portfolio Data
    // =========================================================================

    /// List all projects.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self))]
    pub async fn projects(&self) -> Result<Vec<Project>, BackendError> {
        self.get_json("/api/portfolio/projects").await
    }

    /// List all certifications.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body cannot be parsed.
    #[instrument(skip(self))]
    pub async fn certifications(&self) -> Result<Vec<Certification>, BackendError> {
        self.get_json("/api/portfolio/certifications").await
    }

    /// Forward a contact form message.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or rejects the message.
    #[instrument(skip(self, message), fields(sender = %message.email.masked()))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.url("/api/contact/send"))
            .json(message)
            .send()
            .await
            .map_err(map_send_error)?;

        ensure_success(response).await?;
        Ok(())
    }

    // =========================================================================
    // Admin Projects
    // =========================================================================

    /// Create a project.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or rejects the write.
    #[instrument(skip(self, token, input), fields(title = %input.title))]
    pub async fn create_project(
        &self,
        token: &SecretString,
        input: &ProjectInput,
    ) -> Result<(), BackendError> {
        let form = multipart_form(input.text_fields(), input.image.as_ref())?;
        self.send_admin(
            Method::POST,
            "/api/portfolio/admin/projects",
            token,
            Some(form),
        )
        .await
    }

    /// Replace a project's fields (and image, if one is attached).
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or rejects the write.
    #[instrument(skip(self, token, input), fields(id = %id))]
    pub async fn update_project(
        &self,
        token: &SecretString,
        id: ProjectId,
        input: &ProjectInput,
    ) -> Result<(), BackendError> {
        let form = multipart_form(input.text_fields(), input.image.as_ref())?;
        self.send_admin(
            Method::PUT,
            &format!("/api/portfolio/admin/projects/{id}"),
            token,
            Some(form),
        )
        .await
    }

    /// Delete a project.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or rejects the delete.
    #[instrument(skip(self, token))]
    pub async fn delete_project(
        &self,
        token: &SecretString,
        id: ProjectId,
    ) -> Result<(), BackendError> {
        self.send_admin(
            Method::DELETE,
            &format!("/api/portfolio/admin/projects/{id}"),
            token,
            None,
        )
        .await
    }

    // =========================================================================
    // Admin Certifications
    // =========================================================================

    /// Create a certification.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or rejects the write.
    #[instrument(skip(self, token, input), fields(name = %input.name))]
    pub async fn create_certification(
        &self,
        token: &SecretString,
        input: &CertificationInput,
    ) -> Result<(), BackendError> {
        let form = multipart_form(input.text_fields(), input.image.as_ref())?;
        self.send_admin(
            Method::POST,
            "/api/portfolio/admin/certifications",
            token,
            Some(form),
        )
        .await
    }

    /// Replace a certification's fields (and image, if one is attached).
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or rejects the write.
    #[instrument(skip(self, token, input), fields(id = %id))]
    pub async fn update_certification(
        &self,
        token: &SecretString,
        id: CertificationId,
        input: &CertificationInput,
    ) -> Result<(), BackendError> {
        let form = multipart_form(input.text_fields(), input.image.as_ref())?;
        self.send_admin(
            Method::PUT,
            &format!("/api/portfolio/admin/certifications/{id}"),
            token,
            Some(form),
        )
        .await
    }

    /// Delete a certification.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or rejects the delete.
    #[instrument(skip(self, token))]
    pub async fn delete_certification(
        &self,
        token: &SecretString,
        id: CertificationId,
    ) -> Result<(), BackendError> {
        self.send_admin(
            Method::DELETE,
            &format!("/api/portfolio/admin/certifications/{id}"),
            token,
            None,
        )
        .await
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self
            .inner
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(map_send_error)?;

        let response = ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn send_admin(
        &self,
        method: Method,
        path: &str,
        token: &SecretString,
        form: Option<Form>,
    ) -> Result<(), BackendError> {
        let mut request = self
            .inner
            .client
            .request(method, self.url(path))
            .bearer_auth(token.expose_secret());

        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request.send().await.map_err(map_send_error)?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Classify a transport error, separating timeouts from other failures.
fn map_send_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Http(err)
    }
}

/// Pass 2xx responses through; turn anything else into `BackendError::Api`
/// carrying the JSON `message` field when the body has one.
async fn ensure_success(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());

    tracing::debug!(status = status.as_u16(), ?message, "backend returned an error status");

    Err(BackendError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Build the multipart body for admin writes.
fn multipart_form<'a>(
    fields: impl IntoIterator<Item = (&'static str, &'a str)>,
    image: Option<&ImageUpload>,
) -> Result<Form, BackendError> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value.to_owned());
    }

    if let Some(image) = image {
        let mut part = Part::bytes(image.bytes.clone()).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| BackendError::Parse(format!("invalid image content type: {e}")))?;
        }
        form = form.part("image", part);
    }

    Ok(form)
}
