//! Business logic services for the site.
//!
//! # Services
//!
//! - `resend` - Resend API client (transactional email)
//! - `contact` - Contact submission delivery (owner notification + auto-reply)

pub mod contact;
pub mod resend;

pub use contact::{ContactError, ContactService};
pub use resend::{OutgoingEmail, ResendClient, ResendError, SentEmail};
