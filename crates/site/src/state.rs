//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SiteConfig;
use crate::services::{ContactService, ResendError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and holds only read-only
/// resources: configuration and the contact delivery service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    contact: ContactService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Resend client cannot be built from the
    /// configured API key.
    pub fn new(config: SiteConfig) -> Result<Self, ResendError> {
        let contact = ContactService::from_config(&config)?;
        Ok(Self {
            inner: Arc::new(AppStateInner { config, contact }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the contact delivery service.
    #[must_use]
    pub fn contact(&self) -> &ContactService {
        &self.inner.contact
    }
}
