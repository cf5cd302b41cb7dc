//! CORS, health and documentation routes.
//!
//! Run with: `cargo test -p docrelay-api --test cors_test`

mod helpers;

use axum::http::Method;
use helpers::{setup_test_app, FakeDocumentApi, FakeReply};
use serde_json::Value;

fn app() -> helpers::TestApp {
    setup_test_app(FakeDocumentApi::replying(FakeReply::document()))
}

#[tokio::test]
async fn test_options_short_circuits_with_cors_headers() {
    let app = app();

    for path in ["/api/upload", "/api/extract", "/api/process"] {
        let response = app.client().method(Method::OPTIONS, path).await;

        assert_eq!(response.status_code(), 200);
        assert!(response.as_bytes().is_empty());
        assert_eq!(response.header("access-control-allow-origin"), "*");
        assert_eq!(
            response.header("access-control-allow-methods"),
            "GET, POST, OPTIONS"
        );
        assert_eq!(
            response.header("access-control-allow-headers"),
            "Content-Type, Authorization"
        );
    }
    assert!(app.api.requests().is_empty());
}

#[tokio::test]
async fn test_error_responses_carry_cors_headers() {
    let app = app();

    let response = app.client().get("/api/process").await;

    assert_eq!(response.status_code(), 405);
    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_health() {
    let app = app();

    let response = app.client().get("/api/health").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("access-control-allow-origin"), "*");
    assert!(response.maybe_header("x-request-id").is_some());
    let body: Value = response.json();
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app();

    let response = app.client().get("/api/openapi.json").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert!(body["paths"]["/api/upload"].is_object());
}
