//! Core types for the contact service.
//!
//! This module provides type-safe wrappers for contact form data.

pub mod delivery;
pub mod email;
pub mod submission;

pub use delivery::DeliveryResult;
pub use email::{EMAIL_PATTERN, Email, EmailError};
pub use submission::{ContactForm, ContactSubmission, Field, FieldErrors, ValidationError};
