//! Resend API client for transactional email.
//!
//! Only the single endpoint the contact form needs is wrapped:
//! `POST /emails`, which queues one message and returns its id.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::config::ResendConfig;

/// Errors that can occur when interacting with the Resend API.
#[derive(Debug, Error)]
pub enum ResendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} {name} - {message}")]
    Api {
        status: u16,
        name: String,
        message: String,
    },

    /// Failed to build the client or parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// An email to hand to Resend.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
}

/// Successful send response.
#[derive(Debug, Clone, Deserialize)]
pub struct SentEmail {
    pub id: String,
}

/// Error body returned by Resend.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Resend API client.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct ResendClient {
    client: reqwest::Client,
    emails_url: String,
}

impl std::fmt::Debug for ResendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendClient")
            .field("emails_url", &self.emails_url)
            .finish_non_exhaustive()
    }
}

impl ResendClient {
    /// Create a new Resend API client.
    ///
    /// # Errors
    ///
    /// Returns error if the API key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ResendConfig) -> Result<Self, ResendError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| ResendError::Parse(format!("Invalid API key format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert("Authorization", auth_value);

        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("portfolio-contact/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            emails_url: format!("{}/emails", config.base_url.as_str().trim_end_matches('/')),
        })
    }

    /// Send one email.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Resend rejects the message.
    #[instrument(skip(self, email), fields(subject = %email.subject))]
    pub async fn send(&self, email: &OutgoingEmail) -> Result<SentEmail, ResendError> {
        let response = self.client.post(&self.emails_url).json(email).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        let sent: SentEmail = response
            .json()
            .await
            .map_err(|e| ResendError::Parse(e.to_string()))?;

        tracing::debug!(id = %sent.id, "Email accepted by Resend");
        Ok(sent)
    }
}

/// Build an [`ResendError::Api`] from a non-success response body.
fn api_error(status: u16, body: &str) -> ResendError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => ResendError::Api {
            status: parsed.status_code.unwrap_or(status),
            name: parsed.name.unwrap_or_else(|| "application_error".to_string()),
            message: parsed.message.unwrap_or_default(),
        },
        Err(_) => ResendError::Api {
            status,
            name: "application_error".to_string(),
            message: body.to_string(),
        },
    }
}
