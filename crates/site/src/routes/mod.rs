//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Form widget (HTMX)
//! GET  /contact                - Contact page
//! POST /contact                - Submit form (returns form fragment)
//!
//! # JSON API
//! POST /api/send-email         - Submit contact message
//! ```

pub mod contact;
pub mod contact_form;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::SiteConfig;
use crate::state::AppState;

/// Create the JSON API routes router.
///
/// Cross-origin calls are allowed only from `SITE_ALLOWED_ORIGINS`.
pub fn api_routes(config: &SiteConfig) -> Router<AppState> {
    let router = Router::new().route("/send-email", post(contact::send_email));

    match cors_layer(&config.allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// Build a CORS layer for the configured origins, if any.
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::POST])
            .allow_headers([CONTENT_TYPE]),
    )
}

/// Create all routes for the site.
pub fn routes(config: &SiteConfig) -> Router<AppState> {
    Router::new()
        // Form widget
        .route(
            "/contact",
            get(contact_form::page).post(contact_form::submit),
        )
        // JSON API
        .nest("/api", api_routes(config))
}
