//! Demo results used when the external API yields no usable document
//!
//! Values are deterministic and derived from `DemoConfig`, so clients always
//! receive a well-formed result.

use std::collections::BTreeMap;
use std::fmt::Debug;

use docrelay_core::{
    DemoConfig, ExtractedTable, ExtractionData, OperationOptions, ProcessedDocument, UploadedFile,
    ViewerSession,
};

/// Which kind of processed document a fallback stands in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackKind {
    Converted,
    Watermarked,
}

pub trait FallbackProvider: Send + Sync + Debug {
    fn extraction(&self, file: &UploadedFile, options: &OperationOptions) -> ExtractionData;

    fn session(&self, kind: FallbackKind) -> ViewerSession;

    fn document_url(&self, kind: FallbackKind) -> String;

    fn document(&self, kind: FallbackKind) -> ProcessedDocument {
        ProcessedDocument::new(self.document_url(kind), self.session(kind))
    }
}

#[derive(Debug, Clone)]
pub struct DemoFallback {
    config: DemoConfig,
}

impl DemoFallback {
    pub fn new(config: DemoConfig) -> Self {
        Self { config }
    }
}

impl FallbackProvider for DemoFallback {
    fn extraction(&self, file: &UploadedFile, options: &OperationOptions) -> ExtractionData {
        let tables = if options.extract_tables {
            vec![ExtractedTable {
                headers: vec!["Column 1".to_string(), "Column 2".to_string()],
                rows: vec![vec!["Data 1".to_string(), "Data 2".to_string()]],
            }]
        } else {
            Vec::new()
        };

        let key_value_pairs = if options.extract_key_value_pairs {
            BTreeMap::from([
                ("Key 1".to_string(), "Value 1".to_string()),
                ("Key 2".to_string(), "Value 2".to_string()),
            ])
        } else {
            BTreeMap::new()
        };

        ExtractionData {
            text: format!("Extracted text from {}", file.name),
            tables,
            key_value_pairs,
        }
    }

    fn session(&self, kind: FallbackKind) -> ViewerSession {
        let session_id = match kind {
            FallbackKind::Converted => "demo-session-id",
            FallbackKind::Watermarked => "demo-watermark-session-id",
        };
        let token = &self.config.viewer_token;
        ViewerSession {
            viewer_url: format!(
                "{}/viewer-api/applications/{}/view_document/?session={}",
                self.config.dashboard_url,
                urlencoding::encode(&self.config.application_id),
                urlencoding::encode(token)
            ),
            token: token.clone(),
            session_id: session_id.to_string(),
        }
    }

    fn document_url(&self, kind: FallbackKind) -> String {
        let file = match kind {
            FallbackKind::Converted => "mock-converted-document.pdf",
            FallbackKind::Watermarked => "mock-watermarked-document.pdf",
        };
        format!("{}/{}", self.config.document_base_url, file)
    }
}
