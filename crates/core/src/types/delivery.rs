//! Outcome of delivering a contact submission.

use serde::Serialize;

/// Result of one delivery attempt.
///
/// `auto_reply_sent` is false both when no acknowledgement was attempted and
/// when it failed; in the latter case `error` carries the failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply_message_id: Option<String>,
    pub auto_reply_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryResult {
    /// Owner notification delivered; no acknowledgement attempted.
    #[must_use]
    pub fn owner_only(owner_message_id: String) -> Self {
        Self {
            owner_message_id: Some(owner_message_id),
            ..Self::default()
        }
    }

    /// Record a delivered acknowledgement.
    #[must_use]
    pub fn with_auto_reply(mut self, message_id: String) -> Self {
        self.auto_reply_message_id = Some(message_id);
        self.auto_reply_sent = true;
        self
    }

    /// Record a failed acknowledgement.
    #[must_use]
    pub fn with_auto_reply_error(mut self, error: impl Into<String>) -> Self {
        self.auto_reply_message_id = None;
        self.auto_reply_sent = false;
        self.error = Some(error.into());
        self
    }

    /// True when the acknowledgement was attempted and failed.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}
