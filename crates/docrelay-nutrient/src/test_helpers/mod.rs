//! In-process fakes for the external document API
//!
//! Enabled for this crate's tests and, through the `test-helpers` feature, for
//! dependants that need a scripted `DocumentApi`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use docrelay_core::{
    ExtractedTable, ExtractionData, OperationOptions, UploadedFile, ViewerSession,
};
use serde_json::{json, Value};

use crate::api::{DocumentApi, Endpoint, FilePart};
use crate::error::ApiError;
use crate::fallback::{FallbackKind, FallbackProvider};
use crate::instructions::Instructions;
use crate::response::UpstreamDocument;

/// Scripted answer to a submission.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Json(Value),
    /// Binary PDF body with a content disposition.
    Pdf,
    /// Non-success status with a short body.
    Status(u16),
    Transport,
}

impl FakeReply {
    pub const DOCUMENT_URL: &'static str = "https://docs.example/processed.pdf";
    pub const PDF_BODY: &'static [u8] = b"%PDF-1.7 fake";

    /// A document descriptor pointing at `DOCUMENT_URL`.
    pub fn document() -> Self {
        FakeReply::Json(json!({ "document": Self::DOCUMENT_URL }))
    }

    fn into_result(self) -> Result<UpstreamDocument, ApiError> {
        match self {
            FakeReply::Json(value) => Ok(UpstreamDocument::json(&value)),
            FakeReply::Pdf => {
                let mut document = UpstreamDocument::from_bytes("application/pdf", Self::PDF_BODY);
                document.content_disposition =
                    Some("attachment; filename=\"result.pdf\"".to_string());
                Ok(document)
            }
            FakeReply::Status(status) => Err(ApiError::Upstream {
                status,
                body: format!("upstream status {}", status),
            }),
            FakeReply::Transport => Err(ApiError::Transport("connection reset".to_string())),
        }
    }
}

/// What the fake received for one submission.
#[derive(Debug, Clone)]
pub struct SubmittedRequest {
    pub endpoint: Endpoint,
    pub instructions: Instructions,
    /// (part name, filename, content type, byte length)
    pub files: Vec<(String, String, String, usize)>,
}

#[derive(Debug)]
pub struct FakeDocumentApi {
    default_reply: FakeReply,
    replies_by_filename: HashMap<String, FakeReply>,
    fail_sessions: bool,
    requests: Mutex<Vec<SubmittedRequest>>,
    session_requests: Mutex<Vec<String>>,
}

impl FakeDocumentApi {
    pub fn replying(reply: FakeReply) -> Self {
        Self {
            default_reply: reply,
            replies_by_filename: HashMap::new(),
            fail_sessions: false,
            requests: Mutex::new(Vec::new()),
            session_requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer submissions whose first file has this filename differently.
    pub fn with_reply_for(mut self, filename: &str, reply: FakeReply) -> Self {
        self.replies_by_filename.insert(filename.to_string(), reply);
        self
    }

    pub fn with_failing_sessions(mut self) -> Self {
        self.fail_sessions = true;
        self
    }

    pub fn requests(&self) -> Vec<SubmittedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn submitted(&self) -> Vec<Instructions> {
        self.requests()
            .into_iter()
            .map(|request| request.instructions)
            .collect()
    }

    pub fn session_requests(&self) -> Vec<String> {
        self.session_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentApi for FakeDocumentApi {
    async fn submit(
        &self,
        endpoint: Endpoint,
        instructions: &Instructions,
        files: Vec<FilePart>,
    ) -> Result<UpstreamDocument, ApiError> {
        let reply = files
            .first()
            .and_then(|file| self.replies_by_filename.get(&file.filename))
            .unwrap_or(&self.default_reply)
            .clone();

        self.requests.lock().unwrap().push(SubmittedRequest {
            endpoint,
            instructions: instructions.clone(),
            files: files
                .iter()
                .map(|f| {
                    (
                        f.name.clone(),
                        f.filename.clone(),
                        f.content_type.clone(),
                        f.data.len(),
                    )
                })
                .collect(),
        });

        reply.into_result()
    }

    async fn create_viewer_session(&self, document_url: &str) -> Result<ViewerSession, ApiError> {
        self.session_requests
            .lock()
            .unwrap()
            .push(document_url.to_string());

        if self.fail_sessions {
            return Err(ApiError::Upstream {
                status: 503,
                body: "viewer unavailable".to_string(),
            });
        }

        Ok(ViewerSession::live(
            "https://viewer.example",
            "live-session",
            "live-token",
        ))
    }
}

/// Deterministic fallback with recognisable values.
#[derive(Debug, Clone, Default)]
pub struct FakeFallback;

impl FallbackProvider for FakeFallback {
    fn extraction(&self, file: &UploadedFile, options: &OperationOptions) -> ExtractionData {
        ExtractionData {
            text: format!("fallback text for {}", file.name),
            tables: if options.extract_tables {
                vec![ExtractedTable {
                    headers: vec!["H".to_string()],
                    rows: vec![vec!["V".to_string()]],
                }]
            } else {
                Vec::new()
            },
            key_value_pairs: Default::default(),
        }
    }

    fn session(&self, kind: FallbackKind) -> ViewerSession {
        let id = match kind {
            FallbackKind::Converted => "fallback-converted",
            FallbackKind::Watermarked => "fallback-watermarked",
        };
        ViewerSession {
            token: "fallback-token".to_string(),
            session_id: id.to_string(),
            viewer_url: "https://demo.example/view/?session=fallback-token".to_string(),
        }
    }

    fn document_url(&self, kind: FallbackKind) -> String {
        match kind {
            FallbackKind::Converted => "https://demo.example/converted.pdf".to_string(),
            FallbackKind::Watermarked => "https://demo.example/watermarked.pdf".to_string(),
        }
    }
}
