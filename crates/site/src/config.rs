//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; the server starts without an email provider
//! and answers contact submissions with a configuration error until
//! `RESEND_API_KEY` is set.
//!
//! ## Server
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_STATIC_DIR` - Static asset directory (default: crates/site/static)
//! - `SITE_ALLOWED_ORIGINS` - Comma-separated origins allowed to call the JSON API
//! - `SITE_HTMX_INTEGRITY` - SRI hash (`sha384-...`) for the pinned HTMX script
//!
//! ## Email provider (Resend)
//! - `RESEND_API_KEY` - API key (secret)
//! - `RESEND_API_BASE_URL` - API base URL (default: <https://api.resend.com>)
//! - `RESEND_TIMEOUT_SECS` - Request timeout (default: 10)
//!
//! ## Contact form
//! - `CONTACT_OWNER_EMAIL` - Notification recipient (default: the site owner)
//! - `CONTACT_FROM` - Sender mailbox (default: Portfolio Contact <onboarding@resend.dev>)
//! - `CONTACT_AUTO_REPLY` - Send acknowledgements to senders (default: true)
//!
//! ## Error tracking
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use portfolio_contact_core::Email;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Inbox that receives contact notifications.
pub const DEFAULT_OWNER_EMAIL: &str = "chapokumih@gmail.com";

/// Mailbox notifications are sent from.
pub const DEFAULT_FROM: &str = "Portfolio Contact <onboarding@resend.dev>";

/// Resend REST API base URL.
pub const DEFAULT_RESEND_BASE_URL: &str = "https://api.resend.com";

const DEFAULT_RESEND_TIMEOUT_SECS: u64 = 10;

/// Prefixes that mark a copied-from-docs placeholder (case-insensitive)
const PLACEHOLDER_PREFIXES: &[&str] = &[
    "your-", "your_", "enter-", "enter_", "insert-", "insert_", "put-your", "add-your",
];

/// Markers that never occur in a generated key (case-insensitive)
const PLACEHOLDER_MARKERS: &[&str] = &[
    "changeme",
    "change-me",
    "change_me",
    "placeholder",
    "replace-me",
    "replace_me",
    "<",
    ">",
];

/// Whole values that are placeholders (case-insensitive)
const PLACEHOLDER_VALUES: &[&str] = &["todo", "fixme", "none", "null", "secret", "api-key", "api_key"];

/// Accepted Subresource Integrity hash prefixes.
const INTEGRITY_PREFIXES: &[&str] = &["sha256-", "sha384-", "sha512-"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Origins allowed to call the JSON API cross-origin
    pub allowed_origins: Vec<String>,
    /// Subresource Integrity hash for the HTMX script, if pinned
    pub htmx_integrity: Option<String>,
    /// Resend configuration, `None` when no usable API key is set
    pub resend: Option<ResendConfig>,
    /// Placeholder pattern that caused `RESEND_API_KEY` to be ignored
    pub resend_placeholder: Option<&'static str>,
    /// Contact form behaviour
    pub contact: ContactConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors reported to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Resend API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ResendConfig {
    /// API key (secret)
    pub api_key: SecretString,
    /// API base URL
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Contact form configuration.
#[derive(Debug, Clone)]
pub struct ContactConfig {
    /// Inbox that receives notifications; never sent an acknowledgement
    pub owner_email: Email,
    /// Mailbox used in the `from` header
    pub from: String,
    /// Whether to acknowledge submissions to the sender
    pub auto_reply: bool,
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let host: IpAddr = env.parse_or("SITE_HOST", Some(IpAddr::from([127, 0, 0, 1])))?;
        let port: u16 = env.parse_or("SITE_PORT", Some(3000))?;
        let static_dir = PathBuf::from(env.or_default("SITE_STATIC_DIR", "crates/site/static"));
        let allowed_origins = env
            .optional("SITE_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let htmx_integrity = env
            .optional("SITE_HTMX_INTEGRITY")
            .map(|hash| {
                if INTEGRITY_PREFIXES.iter().any(|p| hash.starts_with(p)) {
                    Ok(hash)
                } else {
                    Err(ConfigError::InvalidEnvVar(
                        "SITE_HTMX_INTEGRITY".to_string(),
                        "expected a sha256-, sha384- or sha512- hash".to_string(),
                    ))
                }
            })
            .transpose()?;

        let resend = ResendConfig::from_env(&env)?;
        let resend_placeholder = env
            .optional("RESEND_API_KEY")
            .as_deref()
            .and_then(placeholder_pattern);
        let contact = ContactConfig::from_env(&env)?;

        Ok(Self {
            host,
            port,
            static_dir,
            allowed_origins,
            htmx_integrity,
            resend,
            resend_placeholder,
            contact,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", Some(1.0))?,
            sentry_traces_sample_rate: env.parse_or("SENTRY_TRACES_SAMPLE_RATE", Some(0.0))?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ResendConfig {
    fn from_env(env: &Env<'_>) -> Result<Option<Self>, ConfigError> {
        let base_url = env.or_default("RESEND_API_BASE_URL", DEFAULT_RESEND_BASE_URL);
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| {
            ConfigError::InvalidEnvVar("RESEND_API_BASE_URL".to_string(), e.to_string())
        })?;
        let timeout = Duration::from_secs(
            env.parse_or("RESEND_TIMEOUT_SECS", Some(DEFAULT_RESEND_TIMEOUT_SECS))?,
        );

        // Placeholder keys would only earn a 401 from the provider
        let Some(api_key) = env
            .optional("RESEND_API_KEY")
            .filter(|key| placeholder_pattern(key).is_none())
        else {
            return Ok(None);
        };

        Ok(Some(Self {
            api_key: SecretString::from(api_key),
            base_url,
            timeout,
        }))
    }
}

impl ContactConfig {
    fn from_env(env: &Env<'_>) -> Result<Self, ConfigError> {
        let owner_email = env.or_default("CONTACT_OWNER_EMAIL", DEFAULT_OWNER_EMAIL);
        let owner_email = Email::parse(&owner_email).map_err(|e| {
            ConfigError::InvalidEnvVar("CONTACT_OWNER_EMAIL".to_string(), e.to_string())
        })?;

        Ok(Self {
            owner_email,
            from: env.or_default("CONTACT_FROM", DEFAULT_FROM),
            auto_reply: parse_bool("CONTACT_AUTO_REPLY", env.optional("CONTACT_AUTO_REPLY"))?
                .unwrap_or(true),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup that treats empty values as unset.
struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    /// Get an optional variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: Option<T>) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
            None => default.ok_or_else(|| {
                ConfigError::InvalidEnvVar(key.to_string(), "no default".to_string())
            }),
        }
    }
}

fn parse_bool(key: &str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    value
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("expected a boolean, got '{other}'"),
            )),
        })
        .transpose()
}

/// Returns the placeholder pattern a secret matches, if any.
///
/// Only clearly shaped placeholders match: generated keys are random base62
/// and routinely contain short words like "todo" or "xxx".
fn placeholder_pattern(secret: &str) -> Option<&'static str> {
    let lower = secret.to_lowercase();

    let matched = PLACEHOLDER_PREFIXES
        .iter()
        .copied()
        .find(|prefix| lower.starts_with(prefix))
        .or_else(|| {
            PLACEHOLDER_MARKERS
                .iter()
                .copied()
                .find(|marker| lower.contains(marker))
        })
        .or_else(|| PLACEHOLDER_VALUES.iter().copied().find(|value| lower == *value));
    if matched.is_some() {
        return matched;
    }

    // re_xxxxxxxx, ********
    let body = lower.strip_prefix("re_").unwrap_or(&lower);
    (!body.is_empty() && body.chars().all(|c| matches!(c, 'x' | '*' | '.'))).then_some("xxx")
}
