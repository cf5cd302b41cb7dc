use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::file::UploadedFile;
use super::operation::Operation;
use super::viewer::ViewerSession;

/// A table recovered from a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Text, tables and key-value pairs extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionData {
    pub text: String,
    #[serde(default)]
    pub tables: Vec<ExtractedTable>,
    #[serde(default)]
    pub key_value_pairs: BTreeMap<String, String>,
}

/// A processed document reachable by URL, with the viewer session opened for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub url: String,
    pub download_url: String,
    pub viewer_url: String,
    pub token: String,
    pub session_id: String,
}

impl ProcessedDocument {
    pub fn new(url: impl Into<String>, session: ViewerSession) -> Self {
        let url = url.into();
        Self {
            download_url: url.clone(),
            url,
            viewer_url: session.viewer_url,
            token: session.token,
            session_id: session.session_id,
        }
    }
}

/// The single result kind carried by a `FileResult`.
///
/// Flattened into the file record, so exactly one of `extractedText`,
/// `convertedPdf`, `watermarkedPdf`, `ocrResult` or `error` appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Extraction {
        #[serde(rename = "extractedText")]
        extracted_text: String,
        #[serde(default)]
        tables: Vec<ExtractedTable>,
        #[serde(rename = "keyValuePairs", default)]
        key_value_pairs: BTreeMap<String, String>,
    },
    Converted {
        #[serde(rename = "convertedPdf")]
        converted_pdf: ProcessedDocument,
    },
    Watermarked {
        #[serde(rename = "watermarkedPdf")]
        watermarked_pdf: ProcessedDocument,
    },
    Ocr {
        #[serde(rename = "ocrResult")]
        ocr_result: String,
    },
    Error {
        error: String,
    },
}

impl FileOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        FileOutcome::Error {
            error: message.into(),
        }
    }
}

impl From<ExtractionData> for FileOutcome {
    fn from(data: ExtractionData) -> Self {
        FileOutcome::Extraction {
            extracted_text: data.text,
            tables: data.tables,
            key_value_pairs: data.key_value_pairs,
        }
    }
}

/// Outcome of one file within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileResult {
    pub filename: String,
    pub size: u64,
    pub mimetype: String,
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileResult {
    pub fn new(file: &UploadedFile, operation: Operation, outcome: FileOutcome) -> Self {
        Self {
            filename: file.name.clone(),
            size: file.size,
            mimetype: file.content_type.clone(),
            operation,
            message: None,
            outcome,
        }
    }

    pub fn failed(file: &UploadedFile, operation: Operation, error: impl Into<String>) -> Self {
        Self::new(file, operation, FileOutcome::error(error))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, FileOutcome::Error { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FileOutcome::Error { error } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_files: usize,
    pub total_size: u64,
    pub operation: Operation,
}

impl BatchSummary {
    pub fn new(operation: Operation) -> Self {
        Self {
            total_files: 0,
            total_size: 0,
            operation,
        }
    }

    pub fn record(&mut self, result: &FileResult) {
        self.total_files += 1;
        self.total_size += result.size;
    }
}

/// Ordered per-file results plus the batch summary; `files[i]` belongs to input `i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub files: Vec<FileResult>,
    pub summary: BatchSummary,
}

impl BatchOutcome {
    pub fn message(&self) -> String {
        format!("Successfully processed {} file(s)", self.files.len())
    }

    pub fn failed_files(&self) -> impl Iterator<Item = &FileResult> {
        self.files.iter().filter(|f| f.is_error())
    }
}
