//! Success envelopes and the streaming passthrough response

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use docrelay_core::{BatchOutcome, BatchSummary, ExtractionData, FileResult};
use docrelay_nutrient::UpstreamDocument;
use serde::Serialize;
use utoipa::ToSchema;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_CONTENT_DISPOSITION: &str = "attachment";

#[derive(Debug, Serialize)]
pub struct BatchData {
    pub files: Vec<FileResult>,
    pub summary: BatchSummary,
}

/// `{success: true, message, data: {files, summary}}`
#[derive(Debug, Serialize)]
pub struct BatchEnvelope {
    pub success: bool,
    pub message: String,
    pub data: BatchData,
}

impl From<BatchOutcome> for BatchEnvelope {
    fn from(outcome: BatchOutcome) -> Self {
        Self {
            success: true,
            message: outcome.message(),
            data: BatchData {
                files: outcome.files,
                summary: outcome.summary,
            },
        }
    }
}

impl IntoResponse for BatchEnvelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{success: true, data: {text, tables, keyValuePairs}}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ExtractionEnvelope {
    pub success: bool,
    pub data: ExtractionData,
}

impl ExtractionEnvelope {
    pub fn new(data: ExtractionData) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Pipe an upstream document into the response body without buffering it.
pub fn passthrough(document: UpstreamDocument) -> Response {
    let content_type = header_or(document.content_type.as_deref(), DEFAULT_CONTENT_TYPE);
    let disposition = header_or(
        document.content_disposition.as_deref(),
        DEFAULT_CONTENT_DISPOSITION,
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(document.body),
    )
        .into_response()
}

fn header_or(value: Option<&str>, default: &'static str) -> HeaderValue {
    value
        .and_then(|v| HeaderValue::from_str(v).ok())
        .unwrap_or_else(|| HeaderValue::from_static(default))
}
