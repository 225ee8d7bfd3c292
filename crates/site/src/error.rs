//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client with a JSON error body. JSON API handlers
//! return `Result<T, AppError>`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portfolio_contact_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

use crate::services::{ContactError, ResendError};

/// Application-level error type for the site.
#[derive(Debug, Error)]
pub enum AppError {
    /// Submitted fields failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Request body could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Delivering the submission failed.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// JSON body returned for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Contact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing body. Internal details are never exposed.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(err @ ValidationError::MissingFields(fields)) => ErrorBody {
                error: err.to_string(),
                details: Some(
                    fields
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
            },
            Self::Validation(err) => ErrorBody {
                error: err.to_string(),
                details: None,
            },
            Self::BadRequest(details) => ErrorBody {
                error: "Invalid request body".to_string(),
                details: Some(details.clone()),
            },
            Self::Contact(ContactError::NotConfigured) => ErrorBody {
                error: "Email service is not configured".to_string(),
                details: Some("Please contact the site administrator.".to_string()),
            },
            Self::Contact(ContactError::Delivery(err)) => ErrorBody {
                error: "Failed to send email".to_string(),
                details: Some(match err {
                    ResendError::Api { message, .. } if !message.is_empty() => message.clone(),
                    _ => "The email provider could not be reached.".to_string(),
                }),
            },
            Self::Contact(ContactError::Template(_)) => ErrorBody {
                error: "Internal server error".to_string(),
                details: None,
            },
        }
    }

    /// Capture server errors to Sentry and log them.
    pub fn report(&self) {
        if self.status().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.report();
        (self.status(), Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("contact", "Contact form submitted", Some(&[("source", "api")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use portfolio_contact_core::{EmailError, Field};

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::Contact(ContactError::NotConfigured);
        assert_eq!(
            err.to_string(),
            "Contact error: email service is not configured"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::Validation(ValidationError::MissingFields(vec![
                Field::Name
            ]))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Validation(ValidationError::InvalidEmail(
                EmailError::InvalidFormat
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Contact(ContactError::NotConfigured)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Contact(ContactError::Template(askama::Error::Fmt))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_fields_body_lists_fields() {
        let body = AppError::Validation(ValidationError::MissingFields(vec![
            Field::Name,
            Field::Message,
        ]))
        .body();
        assert_eq!(body.error, "Missing required fields");
        assert_eq!(body.details.as_deref(), Some("from_name, message"));
    }

    #[test]
    fn test_delivery_body_surfaces_provider_message() {
        let body = AppError::Contact(ContactError::Delivery(ResendError::Api {
            status: 403,
            name: "validation_error".to_string(),
            message: "You can only send testing emails to your own address".to_string(),
        }))
        .body();
        assert_eq!(body.error, "Failed to send email");
        assert_eq!(
            body.details.as_deref(),
            Some("You can only send testing emails to your own address")
        );
    }

    #[test]
    fn test_template_failure_body_hides_details() {
        let body = AppError::Contact(ContactError::Template(askama::Error::Fmt)).body();
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
    }
}
