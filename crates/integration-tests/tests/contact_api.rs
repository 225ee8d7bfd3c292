//! Integration tests for the contact JSON API.
//!
//! Every test runs the full router against a local stub of the Resend API,
//! so provider calls can be counted and inspected.

use axum::{body::Body, http::Request, http::StatusCode};
use portfolio_contact_integration_tests::{
    Failure, OWNER_EMAIL, StubResend, TEST_API_KEY, json_request, send, site_config, test_app,
};
use serde_json::json;

fn submission(name: &str, email: &str, message: &str) -> String {
    json!({
        "from_name": name,
        "from_email": email,
        "message": message,
    })
    .to_string()
}

// =============================================================================
// Successful delivery
// =============================================================================

#[tokio::test]
async fn test_delivers_notification_and_auto_reply() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("Ann", "ann@example.com", "Hi<script>")),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email sent successfully");
    assert!(body["ownerEmailId"].is_string());
    assert!(body["autoReplyId"].is_string());
    assert_eq!(body["autoReplySent"], true);
    assert!(body.get("autoReplyError").is_none());

    assert_eq!(stub.calls(), 2);

    let notification = stub.sent_to(OWNER_EMAIL).expect("owner notification");
    assert_eq!(notification.subject(), "New Message from Ann");
    assert_eq!(notification.reply_to(), Some("ann@example.com"));
    assert!(notification.html().contains("Hi&lt;script&gt;"));
    assert!(!notification.html().contains("Hi<script>"));
    assert_eq!(
        notification.authorization.as_deref(),
        Some(format!("Bearer {TEST_API_KEY}").as_str())
    );

    let ack = stub.sent_to("ann@example.com").expect("auto-reply");
    assert_eq!(ack.reply_to(), Some(OWNER_EMAIL));
    assert!(ack.html().contains("Hi&lt;script&gt;"));
}

#[tokio::test]
async fn test_auto_reply_goes_to_normalized_address() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("Ann", " Ann@Example.COM ", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(stub.sent_to("ann@example.com").is_some());
    assert_eq!(
        stub.sent_to(OWNER_EMAIL).expect("owner notification").reply_to(),
        Some("Ann@Example.COM")
    );
}

#[tokio::test]
async fn test_auto_reply_disabled() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[("CONTACT_AUTO_REPLY", "false")]));

    let response = send(
        app,
        json_request(&submission("Ann", "ann@example.com", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["autoReplySent"], false);
    assert!(body["autoReplyId"].is_null());
    assert!(body.get("autoReplyError").is_none());
    assert_eq!(stub.calls(), 1);
}

#[tokio::test]
async fn test_owner_is_not_sent_an_auto_reply() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("Me", "OWNER@portfolio.dev", "Testing the form")),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["autoReplySent"], false);
    assert_eq!(stub.calls(), 1);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_missing_field_rejected_without_provider_call() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("", "ann@example.com", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(body["details"], "from_name");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_whitespace_only_and_absent_fields_are_missing() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(app, json_request(r#"{"from_email":"   ","message":"\n\t"}"#)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json()["details"],
        "from_name, from_email, message"
    );
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_invalid_email_rejected_without_provider_call() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("Bob", "bob@localhost", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid email address");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(app, json_request(r#"{"from_name": "Ann""#)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Invalid request body");
    assert_eq!(stub.calls(), 0);
}

// =============================================================================
// Provider configuration and failures
// =============================================================================

#[tokio::test]
async fn test_missing_api_key_reports_configuration_error() {
    let stub = StubResend::start().await;
    let app = test_app(site_config(Some(&stub), &[("RESEND_API_KEY", "")]));

    let response = send(
        app,
        json_request(&submission("Ann", "ann@example.com", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Email service is not configured");
    assert_eq!(body["details"], "Please contact the site administrator.");
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_owner_notification_failure_fails_request() {
    let stub = StubResend::start_with(Failure::Recipient(OWNER_EMAIL.to_string())).await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("Ann", "ann@example.com", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Failed to send email");
    assert_eq!(body["details"], "The recipient address is not allowed");
}

#[tokio::test]
async fn test_all_sends_failing_fails_request() {
    let stub = StubResend::start_with(Failure::All).await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("Ann", "ann@example.com", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.json()["error"], "Failed to send email");
}

#[tokio::test]
async fn test_auto_reply_failure_still_succeeds() {
    let stub = StubResend::start_with(Failure::Recipient("ann@example.com".to_string())).await;
    let app = test_app(site_config(Some(&stub), &[]));

    let response = send(
        app,
        json_request(&submission("Ann", "ann@example.com", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert!(body["ownerEmailId"].is_string());
    assert!(body["autoReplyId"].is_null());
    assert_eq!(body["autoReplySent"], false);
    assert!(
        body["autoReplyError"]
            .as_str()
            .is_some_and(|e| e.contains("not allowed"))
    );
    assert_eq!(stub.calls(), 2);
}

#[tokio::test]
async fn test_unreachable_provider_fails_request() {
    let stub = StubResend::start().await;
    let base_url = stub.base_url();
    drop(stub);
    let config = site_config(
        None,
        &[
            ("RESEND_API_KEY", TEST_API_KEY),
            ("RESEND_API_BASE_URL", base_url.as_str()),
            ("RESEND_TIMEOUT_SECS", "2"),
        ],
    );

    let response = send(
        test_app(config),
        json_request(&submission("Ann", "ann@example.com", "Hello")),
    )
    .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json();
    assert_eq!(body["error"], "Failed to send email");
    assert_eq!(body["details"], "The email provider could not be reached.");
}

// =============================================================================
// Ambient routes
// =============================================================================

#[tokio::test]
async fn test_health_and_response_headers() {
    let app = test_app(site_config(None, &[]));

    let response = send(
        app,
        Request::get("/health").body(Body::empty()).expect("request"),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
    assert!(response.headers.contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_send_email_rejects_get() {
    let app = test_app(site_config(None, &[]));

    let response = send(
        app,
        Request::get("/api/send-email")
            .body(Body::empty())
            .expect("request"),
    )
    .await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}
