//! Portfolio Contact Core - Shared types library.
//!
//! This crate provides the types used by the contact service:
//! - `site` - The HTTP server (JSON API and form widget)
//! - `integration-tests` - End-to-end tests against a stub email provider
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Validation rules live here so the form widget and the JSON API
//! reject exactly the same input.
//!
//! # Modules
//!
//! - [`types`] - Email address, contact form, submission and delivery result
//! - [`sanitize`] - HTML escaping for user-supplied fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod sanitize;
pub mod types;

pub use sanitize::{SanitizedSubmission, escape_html, message_to_html};
pub use types::*;
