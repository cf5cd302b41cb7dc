//! Streaming passthrough integration tests.
//!
//! Run with: `cargo test -p docrelay-api --test process_test`

mod helpers;

use docrelay_nutrient::Endpoint;
use helpers::{setup_test_app, upload_form, FakeDocumentApi, FakeReply, PDF_MIME};
use serde_json::Value;

#[tokio::test]
async fn test_process_streams_upstream_document() {
    let app = setup_test_app(FakeDocumentApi::replying(FakeReply::Pdf));

    let response = app
        .client()
        .post("/api/process")
        .multipart(upload_form(
            &[("a.pdf", PDF_MIME, "%PDF-a"), ("b.pdf", PDF_MIME, "%PDF-b")],
            &[(
                "options",
                r#"{"actions":[{"type":"rotate","rotateBy":90}],"output":{"type":"pdfa"}}"#,
            )],
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"result.pdf\""
    );
    assert_eq!(response.as_bytes().as_ref(), FakeReply::PDF_BODY);

    let requests = app.api.requests();
    assert_eq!(requests[0].endpoint, Endpoint::Build);
    let instructions = serde_json::to_value(&requests[0].instructions).unwrap();
    assert_eq!(instructions["parts"][0]["file"], "a.pdf");
    assert_eq!(instructions["parts"][1]["file"], "b.pdf");
    assert_eq!(instructions["actions"][0]["type"], "rotate");
    assert_eq!(instructions["output"]["type"], "pdfa");
    assert_eq!(requests[0].files[1].0, "b.pdf");
}

#[tokio::test]
async fn test_process_sign_uses_sign_endpoint_and_default_output() {
    let app = setup_test_app(FakeDocumentApi::replying(FakeReply::Pdf));

    let response = app
        .client()
        .post("/api/process")
        .multipart(upload_form(
            &[("contract.pdf", PDF_MIME, "%PDF")],
            &[("operation", "sign")],
        ))
        .await;

    assert_eq!(response.status_code(), 200);
    let requests = app.api.requests();
    assert_eq!(requests[0].endpoint, Endpoint::Sign);
    let instructions = serde_json::to_value(&requests[0].instructions).unwrap();
    assert_eq!(instructions["output"]["type"], "pdf");
}

#[tokio::test]
async fn test_process_rejects_invalid_options() {
    let app = setup_test_app(FakeDocumentApi::replying(FakeReply::Pdf));

    for options in ["{not json", r#"{"actions":[{"type":"shred"}]}"#] {
        let response = app
            .client()
            .post("/api/process")
            .multipart(upload_form(
                &[("a.pdf", PDF_MIME, "%PDF")],
                &[("options", options)],
            ))
            .await;

        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid options");
    }
    assert!(app.api.requests().is_empty());
}

#[tokio::test]
async fn test_process_upstream_error_keeps_status() {
    let app = setup_test_app(FakeDocumentApi::replying(FakeReply::Status(401)));

    let response = app
        .client()
        .post("/api/process")
        .multipart(upload_form(&[("a.pdf", PDF_MIME, "%PDF")], &[]))
        .await;

    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], "Nutrient API Error");
}

#[tokio::test]
async fn test_process_requires_files() {
    let app = setup_test_app(FakeDocumentApi::replying(FakeReply::Pdf));

    let response = app
        .client()
        .post("/api/process")
        .multipart(upload_form(&[], &[("operation", "build")]))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No files provided");
}
