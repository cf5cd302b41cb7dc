//! Test helpers: build the router around a scripted document API.
//!
//! Run from workspace root: `cargo test -p docrelay-api`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use docrelay_api::setup::routes;
use docrelay_api::AppState;
use docrelay_core::Config;

pub use docrelay_nutrient::test_helpers::{FakeDocumentApi, FakeFallback, FakeReply};

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Test application: server plus the fake it talks to.
pub struct TestApp {
    pub server: TestServer,
    pub api: Arc<FakeDocumentApi>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let mut env: HashMap<String, String> = HashMap::from([
        (
            "NUTRIENT_PROCESSOR_API_KEY".to_string(),
            "test-processor-key".to_string(),
        ),
        ("ENVIRONMENT".to_string(), "test".to_string()),
    ]);
    for (key, value) in overrides {
        env.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| env.get(key).cloned()).expect("Failed to build test config")
}

pub fn setup_test_app(api: FakeDocumentApi) -> TestApp {
    setup_test_app_with(api, &[])
}

pub fn setup_test_app_with(api: FakeDocumentApi, overrides: &[(&str, &str)]) -> TestApp {
    let config = test_config(overrides);
    let api = Arc::new(api);
    let state = Arc::new(AppState::new(
        config.clone(),
        api.clone(),
        Arc::new(FakeFallback),
    ));

    let app = routes::setup_routes(&config, state);
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp { server, api }
}

pub fn file_part(name: &str, mime: &str, data: &'static [u8]) -> Part {
    Part::bytes(Bytes::from_static(data))
        .file_name(name.to_string())
        .mime_type(mime.to_string())
}

/// A form with one `files` part per entry and the given text fields.
pub fn upload_form(files: &[(&str, &str, &'static str)], fields: &[(&str, &str)]) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (key, value) in fields {
        form = form.add_text(key.to_string(), value.to_string());
    }
    for (name, mime, data) in files {
        form = form.add_part("files", file_part(name, mime, data.as_bytes()));
    }
    form
}
