//! Integration tests for the portfolio contact site.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p portfolio-contact-integration-tests
//! ```
//!
//! Tests drive the full router in-process with `tower::ServiceExt::oneshot`.
//! Outbound email goes to [`StubResend`], a local axum server that mimics the
//! Resend `POST /emails` endpoint and records every request it receives, so
//! no test ever reaches the real provider.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use portfolio_contact_site::{config::SiteConfig, state::AppState};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tower::ServiceExt;

/// Inbox configured as the site owner in every test.
pub const OWNER_EMAIL: &str = "owner@portfolio.dev";

/// API key handed to the site; the stub records it with each request.
pub const TEST_API_KEY: &str = "re_int_4Tz9Lq";

/// Which sends the stub should reject.
#[derive(Debug, Clone, Default)]
pub enum Failure {
    /// Accept everything.
    #[default]
    None,
    /// Reject every send.
    All,
    /// Reject sends addressed to this recipient.
    Recipient(String),
}

/// One request received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedEmail {
    pub authorization: Option<String>,
    pub body: Value,
}

impl RecordedEmail {
    /// First `to` address of the message.
    #[must_use]
    pub fn to(&self) -> &str {
        self.body["to"][0].as_str().unwrap_or_default()
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        self.body["subject"].as_str().unwrap_or_default()
    }

    #[must_use]
    pub fn html(&self) -> &str {
        self.body["html"].as_str().unwrap_or_default()
    }

    #[must_use]
    pub fn reply_to(&self) -> Option<&str> {
        self.body["reply_to"].as_str()
    }
}

#[derive(Default)]
struct StubState {
    failure: Failure,
    received: Mutex<Vec<RecordedEmail>>,
}

/// Local stand-in for the Resend API.
///
/// The server task is aborted when the stub is dropped.
pub struct StubResend {
    addr: SocketAddr,
    state: Arc<StubState>,
    task: JoinHandle<()>,
}

impl StubResend {
    /// Start a stub that accepts every send.
    pub async fn start() -> Self {
        Self::start_with(Failure::None).await
    }

    /// Start a stub that rejects the sends selected by `failure`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start_with(failure: Failure) -> Self {
        let state = Arc::new(StubState {
            failure,
            received: Mutex::default(),
        });

        let app = Router::new()
            .route("/emails", post(receive_email))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub listener");
        let addr = listener.local_addr().expect("stub local address");

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state, task }
    }

    /// Base URL to configure as `RESEND_API_BASE_URL`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Everything received so far, in arrival order.
    #[must_use]
    pub fn received(&self) -> Vec<RecordedEmail> {
        self.state
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of send calls received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.received().len()
    }

    /// The message addressed to `recipient`, if one arrived.
    #[must_use]
    pub fn sent_to(&self, recipient: &str) -> Option<RecordedEmail> {
        self.received().into_iter().find(|e| e.to() == recipient)
    }
}

impl Drop for StubResend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn receive_email(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let email = RecordedEmail {
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body,
    };

    let rejected = match &state.failure {
        Failure::None => false,
        Failure::All => true,
        Failure::Recipient(address) => email.to() == address.as_str(),
    };

    let count = {
        let mut received = state
            .received
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        received.push(email);
        received.len()
    };

    if rejected {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "statusCode": 422,
                "name": "validation_error",
                "message": "The recipient address is not allowed",
            })),
        )
            .into_response();
    }

    Json(json!({ "id": format!("msg_{count}") })).into_response()
}

/// Build site configuration for a test.
///
/// With a stub, the Resend key and base URL point at it; without one, the
/// email provider is left unconfigured. `extra` overrides or adds variables.
///
/// # Panics
///
/// Panics if the resulting configuration is invalid.
#[must_use]
pub fn site_config(stub: Option<&StubResend>, extra: &[(&str, &str)]) -> SiteConfig {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("CONTACT_OWNER_EMAIL".into(), OWNER_EMAIL.into());
    vars.insert(
        "SITE_STATIC_DIR".into(),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../site/static").into(),
    );
    if let Some(stub) = stub {
        vars.insert("RESEND_API_KEY".into(), TEST_API_KEY.into());
        vars.insert("RESEND_API_BASE_URL".into(), stub.base_url());
        vars.insert("RESEND_TIMEOUT_SECS".into(), "5".into());
    }
    for (key, value) in extra {
        vars.insert((*key).to_string(), (*value).to_string());
    }

    SiteConfig::from_lookup(|key| vars.get(key).cloned()).expect("valid test configuration")
}

/// Build the application router for a configuration.
///
/// # Panics
///
/// Panics if application state cannot be built.
#[must_use]
pub fn test_app(config: SiteConfig) -> Router {
    portfolio_contact_site::app(AppState::new(config).expect("application state"))
}

/// Response captured from the router.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Body parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("JSON response body")
    }
}

/// Send one request through the router.
///
/// # Panics
///
/// Panics if the router fails or the body cannot be read.
pub async fn send(app: Router, request: Request<Body>) -> TestResponse {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Build a `POST /api/send-email` request with a raw JSON body.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn json_request(body: &str) -> Request<Body> {
    Request::post("/api/send-email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .expect("valid request")
}

/// Build a `POST /contact` form submission as sent by HTMX.
///
/// # Panics
///
/// Panics if the request cannot be built.
#[must_use]
pub fn form_request(fields: &[(&str, &str)]) -> Request<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();

    Request::post("/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(Body::from(body))
        .expect("valid request")
}
