//! Contact form delivery.
//!
//! Turns a validated [`ContactSubmission`] into a notification for the site
//! owner and, optionally, an acknowledgement for the sender, and sends both
//! through Resend concurrently.

use askama::Template;
use portfolio_contact_core::{ContactSubmission, DeliveryResult};
use thiserror::Error;
use tracing::instrument;

use super::resend::{OutgoingEmail, ResendClient, ResendError};
use crate::config::{ContactConfig, SiteConfig};

/// Owner notification body. Fields are pre-escaped.
#[derive(Template)]
#[template(path = "email/owner_notification.html")]
struct OwnerNotificationHtml<'a> {
    name: &'a str,
    email: &'a str,
    message_html: &'a str,
    received_at: String,
}

/// Sender acknowledgement body. Fields are pre-escaped.
#[derive(Template)]
#[template(path = "email/auto_reply.html")]
struct AutoReplyHtml<'a> {
    name: &'a str,
    message_html: &'a str,
}

/// Errors that can occur when delivering a submission.
#[derive(Debug, Error)]
pub enum ContactError {
    /// No Resend API key is configured.
    #[error("email service is not configured")]
    NotConfigured,

    /// The owner notification could not be delivered.
    #[error("failed to deliver notification: {0}")]
    Delivery(#[source] ResendError),

    /// An email body failed to render.
    #[error("failed to render email: {0}")]
    Template(#[from] askama::Error),
}

/// Service that delivers contact submissions.
#[derive(Debug, Clone)]
pub struct ContactService {
    resend: Option<ResendClient>,
    config: ContactConfig,
}

impl ContactService {
    /// Create a contact service.
    ///
    /// `resend` is `None` when the provider is not configured; every delivery
    /// then fails with [`ContactError::NotConfigured`] without network I/O.
    #[must_use]
    pub const fn new(resend: Option<ResendClient>, config: ContactConfig) -> Self {
        Self { resend, config }
    }

    /// Build the service from site configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the Resend client cannot be built.
    pub fn from_config(config: &SiteConfig) -> Result<Self, ResendError> {
        let resend = config.resend.as_ref().map(ResendClient::new).transpose()?;
        Ok(Self::new(resend, config.contact.clone()))
    }

    /// Whether a Resend client is available.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.resend.is_some()
    }

    /// Build the notification sent to the site owner.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to render.
    pub fn owner_notification(
        &self,
        submission: &ContactSubmission,
    ) -> Result<OutgoingEmail, askama::Error> {
        let sanitized = submission.sanitize();
        let html = OwnerNotificationHtml {
            name: sanitized.name(),
            email: sanitized.email(),
            message_html: sanitized.message_html(),
            received_at: chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        }
        .render()?;

        Ok(OutgoingEmail {
            from: self.config.from.clone(),
            to: vec![self.config.owner_email.to_string()],
            reply_to: Some(submission.sender_email().to_string()),
            subject: format!(
                "New Message from {}",
                subject_safe(submission.sender_name())
            ),
            html,
        })
    }

    /// Build the acknowledgement sent to the submitter.
    ///
    /// Returns `None` when acknowledgements are disabled or the sender is the
    /// owner.
    ///
    /// # Errors
    ///
    /// Returns error if the template fails to render.
    pub fn auto_reply(
        &self,
        submission: &ContactSubmission,
    ) -> Result<Option<OutgoingEmail>, askama::Error> {
        if !self.config.auto_reply
            || submission
                .sender_email()
                .same_address(&self.config.owner_email)
        {
            return Ok(None);
        }

        let sanitized = submission.sanitize();
        let html = AutoReplyHtml {
            name: sanitized.name(),
            message_html: sanitized.message_html(),
        }
        .render()?;

        Ok(Some(OutgoingEmail {
            from: self.config.from.clone(),
            to: vec![submission.sender_email().normalized()],
            reply_to: Some(self.config.owner_email.to_string()),
            subject: "Thanks for getting in touch".to_string(),
            html,
        }))
    }

    /// Deliver a submission.
    ///
    /// The owner notification and the acknowledgement are sent concurrently.
    /// A failed notification fails the delivery; a failed acknowledgement is
    /// logged and recorded in the returned [`DeliveryResult`].
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::NotConfigured`] before any network call if no
    /// client is configured, [`ContactError::Delivery`] if the owner
    /// notification fails.
    #[instrument(skip_all, fields(sender_domain = %submission.sender_email().domain()))]
    pub async fn deliver(
        &self,
        submission: &ContactSubmission,
    ) -> Result<DeliveryResult, ContactError> {
        let Some(client) = self.resend.as_ref() else {
            return Err(ContactError::NotConfigured);
        };

        let notification = self.owner_notification(submission)?;
        let acknowledgement = self.auto_reply(submission)?;

        let notify = client.send(&notification);
        let acknowledge = async {
            match &acknowledgement {
                Some(email) => Some(client.send(email).await),
                None => None,
            }
        };
        let (notified, acknowledged) = tokio::join!(notify, acknowledge);

        let sent = match notified {
            Ok(sent) => sent,
            Err(e) => {
                if matches!(acknowledged, Some(Ok(_))) {
                    tracing::warn!("Acknowledgement sent although owner notification failed");
                }
                return Err(ContactError::Delivery(e));
            }
        };
        tracing::info!(owner_message_id = %sent.id, "Owner notification sent");

        let result = DeliveryResult::owner_only(sent.id);
        Ok(match acknowledged {
            None => result,
            Some(Ok(ack)) => {
                tracing::info!(auto_reply_id = %ack.id, "Auto-reply sent");
                result.with_auto_reply(ack.id)
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Auto-reply failed; notification was delivered");
                result.with_auto_reply_error(e.to_string())
            }
        })
    }
}

/// Collapse control characters so a name cannot break the subject line.
fn subject_safe(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
