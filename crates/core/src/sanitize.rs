//! HTML escaping for user-supplied contact fields.
//!
//! Notification emails embed the sender's name, address and message in
//! generated markup. Every field goes through [`escape_html`] exactly once,
//! when a [`SanitizedSubmission`] is built; templates then insert the
//! pre-escaped values verbatim.

use crate::types::ContactSubmission;

/// Escape the five HTML-significant characters.
///
/// | Input | Output |
/// |-------|--------|
/// | `&` | `&amp;` |
/// | `<` | `&lt;` |
/// | `>` | `&gt;` |
/// | `"` | `&quot;` |
/// | `'` | `&#039;` |
///
/// ```
/// use portfolio_contact_core::escape_html;
///
/// assert_eq!(escape_html("Hi<script>"), "Hi&lt;script&gt;");
/// ```
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a multi-line message and turn its line breaks into `<br>`.
///
/// Escaping runs first so the inserted `<br>` tags survive.
#[must_use]
pub fn message_to_html(input: &str) -> String {
    escape_html(input)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br>")
}

/// A contact submission whose fields are safe to embed in HTML.
///
/// Only obtainable through [`ContactSubmission::sanitize`], so a value of this
/// type has been escaped exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    name: String,
    email: String,
    message_html: String,
}

impl SanitizedSubmission {
    pub(crate) fn new(submission: &ContactSubmission) -> Self {
        Self {
            name: escape_html(submission.sender_name()),
            email: escape_html(submission.sender_email().as_str()),
            message_html: message_to_html(submission.message()),
        }
    }

    /// Escaped sender name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Escaped sender address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Escaped message with `<br>` line breaks.
    #[must_use]
    pub fn message_html(&self) -> &str {
        &self.message_html
    }
}
