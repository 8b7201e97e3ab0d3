//! Contact form route handler.
//!
//! The form posts JSON (see `static/js/contact.js`) and gets JSON back.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use portfolio_core::Email;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::ContactMessage;
use crate::state::AppState;

const SENT: &str = "Thank you for your message! It has been sent.";
const SEND_FAILED: &str = "Failed to send message. Please try again later.";
const INVALID_EMAIL: &str = "Please enter a valid email address.";
const MISSING_FIELDS: &str = "Name, subject and message are required.";

/// Longest accepted message body, in characters.
const MAX_MESSAGE_CHARS: usize = 5000;

/// Contact form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

/// Response for form submission.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

impl ContactResponse {
    fn reply(status: StatusCode, success: bool, message: &str) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                success,
                message: message.to_string(),
            }),
        )
    }
}

impl ContactForm {
    /// Validate and trim the submission.
    fn validate(self) -> Result<ContactMessage, &'static str> {
        let email = Email::parse(&self.email).map_err(|_| INVALID_EMAIL)?;

        let name = self.name.trim();
        let subject = self.subject.trim();
        let message = self.message.trim();
        if name.is_empty() || subject.is_empty() || message.is_empty() {
            return Err(MISSING_FIELDS);
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err("Message is too long.");
        }

        Ok(ContactMessage {
            name: name.to_string(),
            email,
            subject: subject.to_string(),
            message: message.to_string(),
        })
    }
}

/// Forward a contact message to the backend.
///
/// POST /contact
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Json(form): Json<ContactForm>,
) -> impl IntoResponse {
    let message = match form.validate() {
        Ok(message) => message,
        Err(reason) => return ContactResponse::reply(StatusCode::BAD_REQUEST, false, reason),
    };

    match state.backend().send_contact(&message).await {
        Ok(()) => {
            tracing::info!(sender = %message.email.masked(), "contact message forwarded");
            ContactResponse::reply(StatusCode::OK, true, SENT)
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to forward contact message");
            let status = if e.is_connectivity() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::BAD_GATEWAY
            };
            ContactResponse::reply(status, false, SEND_FAILED)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, subject: &str, message: &str) -> ContactForm {
        ContactForm {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let message = form(" Ana ", "ana@example.com", " Hi ", " Hello there ")
            .validate()
            .unwrap();
        assert_eq!(message.name, "Ana");
        assert_eq!(message.subject, "Hi");
        assert_eq!(message.message, "Hello there");
    }

    #[test]
    fn test_invalid_email() {
        assert_eq!(
            form("Ana", "not-an-email", "Hi", "Hello").validate().unwrap_err(),
            INVALID_EMAIL
        );
    }

    #[test]
    fn test_missing_fields() {
        for f in [
            form("", "ana@example.com", "Hi", "Hello"),
            form("Ana", "ana@example.com", " ", "Hello"),
            form("Ana", "ana@example.com", "Hi", ""),
        ] {
            assert_eq!(f.validate().unwrap_err(), MISSING_FIELDS);
        }
    }

    #[test]
    fn test_message_too_long() {
        let long = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(form("Ana", "ana@example.com", "Hi", &long).validate().is_err());
    }
}
