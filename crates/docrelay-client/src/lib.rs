//! HTTP client for the docrelay API.
//!
//! Mirrors the calls the document add-ins make (`/api/upload`, `/api/extract`
//! and `/api/process`) and decodes the relay's envelopes into typed results.
//! The add-in flows themselves live in [`addin`].

pub mod addin;
pub mod error;
pub mod host;

use std::time::Duration;

use bytes::Bytes;
use docrelay_core::{
    BatchOutcome, BatchSummary, ExtractionData, FileResult, OperationOptions, OperationRequest,
    UploadedFile,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;

pub use addin::AddinWorkflow;
pub use error::ClientError;
pub use host::{DocumentHost, HostError};

pub type Result<T> = std::result::Result<T, ClientError>;

const DEFAULT_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// A batch the relay accepted. Individual files may still have failed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub message: String,
    pub outcome: BatchOutcome,
}

impl BatchReport {
    pub fn files(&self) -> &[FileResult] {
        &self.outcome.files
    }

    pub fn summary(&self) -> &BatchSummary {
        &self.outcome.summary
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &FileResult> {
        self.outcome.failed_files()
    }
}

/// A binary result streamed back by `/api/process`.
#[derive(Debug, Clone)]
pub struct BinaryDocument {
    pub content_type: String,
    pub content_disposition: Option<String>,
    pub data: Bytes,
}

impl BinaryDocument {
    /// Filename from `Content-Disposition`, if the relay sent one.
    pub fn file_name(&self) -> Option<String> {
        let disposition = self.content_disposition.as_deref()?;
        disposition
            .split(';')
            .map(str::trim)
            .find_map(|param| param.strip_prefix("filename="))
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    }
}

#[derive(Deserialize)]
struct BatchEnvelope {
    message: String,
    data: BatchOutcome,
}

#[derive(Deserialize)]
struct ExtractionEnvelope {
    data: ExtractionData,
}

#[derive(Deserialize)]
struct FailureEnvelope {
    error: String,
    #[serde(default)]
    message: Option<String>,
}

/// HTTP client for the docrelay API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create client from `DOCRELAY_API_URL`, defaulting to a local relay.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("DOCRELAY_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run one operation over a batch of files.
    pub async fn upload(
        &self,
        files: &[UploadedFile],
        request: &OperationRequest,
    ) -> Result<BatchReport> {
        let mut form = option_fields(&request.options)
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
            .text("operation", request.operation.as_str());
        for file in files {
            form = form.part("files", file_part(file)?);
        }

        let response = self.post("/api/upload", form).await?;
        let envelope: BatchEnvelope = response.json().await.map_err(invalid_response)?;

        let report = BatchReport {
            message: envelope.message,
            outcome: envelope.data,
        };
        let failed = report.failed_files().count();
        if failed > 0 {
            tracing::warn!(failed = failed, total = report.files().len(), "Some files failed");
        }
        Ok(report)
    }

    /// Extract text, tables and key-value pairs from one document.
    pub async fn extract(
        &self,
        file: &UploadedFile,
        options: &OperationOptions,
    ) -> Result<ExtractionData> {
        let form = option_fields(options)
            .into_iter()
            .filter(|(key, _)| !key.starts_with("watermark"))
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
            .part("file", file_part(file)?);

        let response = self.post("/api/extract", form).await?;
        let envelope: ExtractionEnvelope = response.json().await.map_err(invalid_response)?;
        Ok(envelope.data)
    }

    /// Forward files with raw `{actions, output}` options and collect the binary result.
    pub async fn process(
        &self,
        files: &[UploadedFile],
        operation: Option<&str>,
        options: &serde_json::Value,
    ) -> Result<BinaryDocument> {
        let mut form = Form::new().text("options", options.to_string());
        if let Some(operation) = operation {
            form = form.text("operation", operation.to_string());
        }
        for file in files {
            form = form.part("files", file_part(file)?);
        }

        let response = self.post("/api/process", form).await?;
        let header = |name: reqwest::header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(reqwest::header::CONTENT_TYPE)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let content_disposition = header(reqwest::header::CONTENT_DISPOSITION);

        Ok(BinaryDocument {
            content_type,
            content_disposition,
            data: response.bytes().await?,
        })
    }

    async fn post(&self, path: &str, form: Form) -> Result<Response> {
        let response = self
            .client
            .post(self.build_url(path))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(response)
    }
}

fn option_fields(options: &OperationOptions) -> Vec<(&'static str, String)> {
    vec![
        ("extractTables", options.extract_tables.to_string()),
        (
            "extractKeyValuePairs",
            options.extract_key_value_pairs.to_string(),
        ),
        ("language", options.language.clone()),
        ("watermarkText", options.watermark.text.clone()),
        ("watermarkPosition", options.watermark.position.clone()),
        ("watermarkOpacity", options.watermark.opacity.to_string()),
        ("watermarkRotation", options.watermark.rotation.to_string()),
        ("watermarkColor", options.watermark.font_color.clone()),
    ]
}

fn file_part(file: &UploadedFile) -> Result<Part> {
    Ok(Part::bytes(file.data.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.content_type)?)
}

fn invalid_response(err: reqwest::Error) -> ClientError {
    ClientError::InvalidResponse(err.to_string())
}

async fn failure(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    match serde_json::from_str::<FailureEnvelope>(&text) {
        Ok(envelope) => ClientError::Request {
            status,
            error: envelope.error,
            message: envelope.message,
        },
        Err(_) => ClientError::Request {
            status,
            error: text,
            message: None,
        },
    }
}
