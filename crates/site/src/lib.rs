//! Portfolio contact site library.
//!
//! Serves the contact form widget and the JSON delivery endpoint. Exposed as
//! a library so the router can be driven in tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::Request, middleware as axum_middleware, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};

use state::AppState;

/// Build the full application router with its middleware stack.
///
/// Sentry layers are not included; the binary wraps the router with them.
pub fn app(state: AppState) -> Router {
    let config = state.config();

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(config))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not contact the email provider.
async fn health() -> &'static str {
    "ok"
}
