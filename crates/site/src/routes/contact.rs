//! Contact form JSON API.
//!
//! `POST /api/send-email` validates the submission, forwards it to the
//! owner's inbox through Resend and optionally acknowledges the sender.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use portfolio_contact_core::{ContactForm, DeliveryResult};
use serde::Serialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::state::AppState;

/// Response for a delivered submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: &'static str,
    pub owner_email_id: Option<String>,
    pub auto_reply_id: Option<String>,
    pub auto_reply_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply_error: Option<String>,
}

impl From<DeliveryResult> for SendEmailResponse {
    fn from(result: DeliveryResult) -> Self {
        Self {
            success: true,
            message: "Email sent successfully",
            owner_email_id: result.owner_message_id,
            auto_reply_id: result.auto_reply_message_id,
            auto_reply_sent: result.auto_reply_sent,
            auto_reply_error: result.error,
        }
    }
}

/// Send a contact message.
///
/// POST /api/send-email
///
/// Validation and configuration failures return before any call to the
/// email provider.
#[instrument(skip_all)]
pub async fn send_email(
    State(state): State<AppState>,
    body: std::result::Result<Json<ContactForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SendEmailResponse>)> {
    let Json(form) = body?;
    let submission = form.validate()?;

    add_breadcrumb(
        "contact",
        "Contact form submitted",
        Some(&[
            ("source", "api"),
            ("sender_domain", submission.sender_email().domain()),
        ]),
    );

    let result = state.contact().deliver(&submission).await?;
    Ok((StatusCode::OK, Json(result.into())))
}
