//! Contact form submission types and validation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::email::{Email, EmailError};
use crate::sanitize::SanitizedSubmission;

/// A field of the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Sender's name (`from_name`).
    Name,
    /// Sender's email address (`from_email`).
    Email,
    /// Message body (`message`).
    Message,
}

impl Field {
    /// Name of the field on the wire and in the HTML form.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "from_name",
            Self::Email => "from_email",
            Self::Message => "message",
        }
    }

    /// Message shown next to the field when it is left blank.
    #[must_use]
    pub const fn required_message(self) -> &'static str {
        match self {
            Self::Name => "Name is required",
            Self::Email => "Email is required",
            Self::Message => "Message is required",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Reasons a [`ContactForm`] is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more fields are absent or blank.
    #[error("Missing required fields")]
    MissingFields(Vec<Field>),
    /// The sender address does not match the accepted pattern.
    #[error("Invalid email address")]
    InvalidEmail(#[source] EmailError),
}

/// Raw contact form as received from the browser.
///
/// Every field is optional so that an absent field surfaces as a
/// [`ValidationError`] instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactForm {
    #[serde(default)]
    pub from_name: Option<String>,
    #[serde(default)]
    pub from_email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactForm {
    /// Validate the form into a [`ContactSubmission`].
    ///
    /// Missing fields are reported before the email format, so a form with a
    /// blank name and a malformed address yields
    /// [`ValidationError::MissingFields`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingFields`] listing every blank field, or
    /// [`ValidationError::InvalidEmail`] if the address fails the pattern.
    pub fn validate(&self) -> Result<ContactSubmission, ValidationError> {
        let missing: Vec<Field> = [
            (Field::Name, &self.from_name),
            (Field::Email, &self.from_email),
            (Field::Message, &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value.as_deref()))
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let sender_email = Email::parse(self.from_email.as_deref().unwrap_or_default())
            .map_err(ValidationError::InvalidEmail)?;

        Ok(ContactSubmission {
            sender_name: self.from_name.as_deref().unwrap_or_default().trim().to_owned(),
            sender_email,
            message: self.message.clone().unwrap_or_default(),
        })
    }

    /// Per-field messages for inline display in the form widget.
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        let email = if is_blank(self.from_email.as_deref()) {
            Some(Field::Email.required_message().to_owned())
        } else {
            Email::parse(self.from_email.as_deref().unwrap_or_default())
                .err()
                .map(|_| "Invalid email address".to_owned())
        };

        FieldErrors {
            name: is_blank(self.from_name.as_deref())
                .then(|| Field::Name.required_message().to_owned()),
            email,
            message: is_blank(self.message.as_deref())
                .then(|| Field::Message.required_message().to_owned()),
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Inline error messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl FieldErrors {
    /// Returns true if no field has an error.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.message.is_none()
    }
}

/// A validated contact submission.
///
/// Exists only for the duration of one request and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    sender_name: String,
    sender_email: Email,
    message: String,
}

impl ContactSubmission {
    /// Sender's name, trimmed.
    #[must_use]
    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    /// Sender's address as submitted (trimmed).
    #[must_use]
    pub const fn sender_email(&self) -> &Email {
        &self.sender_email
    }

    /// Message body exactly as typed.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Escape every field for embedding in HTML.
    #[must_use]
    pub fn sanitize(&self) -> SanitizedSubmission {
        SanitizedSubmission::new(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(name: Option<&str>, email: Option<&str>, message: Option<&str>) -> ContactForm {
        ContactForm {
            from_name: name.map(String::from),
            from_email: email.map(String::from),
            message: message.map(String::from),
        }
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let submission = form(Some(" Ann "), Some("ann@example.com"), Some("Hello\n"))
            .validate()
            .unwrap();

        assert_eq!(submission.sender_name(), "Ann");
        assert_eq!(submission.sender_email().as_str(), "ann@example.com");
        assert_eq!(submission.message(), "Hello\n");
    }

    #[test]
    fn test_validate_keeps_message_indentation() {
        let submission = form(Some("Ann"), Some("ann@example.com"), Some("  fn main() {}\n"))
            .validate()
            .unwrap();

        assert_eq!(submission.message(), "  fn main() {}\n");
    }

    #[test]
    fn test_validate_reports_all_missing_fields() {
        let err = ContactForm::default().validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec![Field::Name, Field::Email, Field::Message])
        );
        assert_eq!(err.to_string(), "Missing required fields");
    }

    #[test]
    fn test_validate_treats_whitespace_as_missing() {
        let err = form(Some("Ann"), Some("ann@example.com"), Some("  \n "))
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec![Field::Message]));
    }

    #[test]
    fn test_validate_missing_takes_precedence_over_invalid_email() {
        let err = form(None, Some("nope"), Some("hi")).validate().unwrap_err();
        assert_eq!(err, ValidationError::MissingFields(vec![Field::Name]));
    }

    #[test]
    fn test_validate_rejects_invalid_email() {
        let err = form(Some("Ann"), Some("ann@example"), Some("hi"))
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidEmail(EmailError::InvalidFormat)
        ));
        assert_eq!(err.to_string(), "Invalid email address");
    }

    #[test]
    fn test_field_errors_for_empty_form() {
        let errors = ContactForm::default().field_errors();
        assert_eq!(errors.name.as_deref(), Some("Name is required"));
        assert_eq!(errors.email.as_deref(), Some("Email is required"));
        assert_eq!(errors.message.as_deref(), Some("Message is required"));
    }

    #[test]
    fn test_field_errors_flags_bad_email_only() {
        let errors = form(Some("Ann"), Some("ann@"), Some("hi")).field_errors();
        assert!(errors.name.is_none());
        assert_eq!(errors.email.as_deref(), Some("Invalid email address"));
        assert!(errors.message.is_none());
    }

    #[test]
    fn test_field_errors_empty_for_valid_form() {
        assert!(
            form(Some("Ann"), Some("ann@example.com"), Some("hi"))
                .field_errors()
                .is_empty()
        );
    }

    #[test]
    fn test_deserialize_tolerates_absent_fields() {
        let parsed: ContactForm = serde_json::from_str(r#"{"from_name":"Ann"}"#).unwrap();
        assert_eq!(parsed.from_name.as_deref(), Some("Ann"));
        assert!(parsed.from_email.is_none());
        assert!(parsed.message.is_none());
    }

    #[test]
    fn test_field_wire_names() {
        assert_eq!(Field::Name.to_string(), "from_name");
        assert_eq!(Field::Email.to_string(), "from_email");
        assert_eq!(Field::Message.to_string(), "message");
    }
}
