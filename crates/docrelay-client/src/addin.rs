//! Add-in workflows
//!
//! Each flow reads from or writes to the host document and makes exactly one
//! relay call. Watermark and OCR work on a PDF the user picked, not on the
//! open document.

use bytes::Bytes;
use docrelay_core::{
    ExtractionData, Operation, OperationOptions, OperationRequest, UploadedFile, WatermarkOptions,
};
use serde_json::json;

use crate::host::DocumentHost;
use crate::{ApiClient, BatchReport, BinaryDocument, Result};

const PDF_MIME: &str = "application/pdf";
const OCTET_STREAM: &str = "application/octet-stream";

/// Content type for a document name, by extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MIME,
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "ppt" => "application/vnd.ms-powerpoint",
        "odt" => "application/vnd.oasis.opendocument.text",
        "rtf" => "application/rtf",
        "txt" => "text/plain",
        _ => OCTET_STREAM,
    }
}

pub struct AddinWorkflow<H: DocumentHost> {
    client: ApiClient,
    host: H,
    extract_options: OperationOptions,
}

impl<H: DocumentHost> AddinWorkflow<H> {
    /// Extraction defaults to tables on, key-value pairs off, English.
    pub fn new(client: ApiClient, host: H) -> Self {
        Self {
            client,
            host,
            extract_options: OperationOptions {
                extract_tables: true,
                ..Default::default()
            },
        }
    }

    pub fn with_extract_options(mut self, options: OperationOptions) -> Self {
        self.extract_options = options;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    async fn open_document(&self) -> Result<UploadedFile> {
        let bytes = self.host.document_bytes().await?;
        let name = self.host.document_name();
        let content_type = content_type_for(&name);
        Ok(UploadedFile::new(name, content_type, Bytes::from(bytes)))
    }

    /// Extract text from the open document and put it in place of the selection.
    pub async fn extract_and_insert(&self) -> Result<ExtractionData> {
        let document = self.open_document().await?;
        let data = self.client.extract(&document, &self.extract_options).await?;

        self.host.replace_selection(&data.text).await?;
        tracing::info!(file = %document.name, chars = data.text.len(), "Extracted text inserted");
        Ok(data)
    }

    /// Convert the open document; failures of the single file are in the report.
    pub async fn convert_to_pdf(&self) -> Result<BatchReport> {
        let document = self.open_document().await?;
        self.client
            .upload(&[document], &OperationRequest::new(Operation::Convert))
            .await
    }

    pub async fn watermark_pdf(
        &self,
        pdf: Bytes,
        options: &WatermarkOptions,
    ) -> Result<BinaryDocument> {
        let options = json!({
            "actions": [{
                "type": "watermark",
                "watermarkType": "text",
                "text": options.text,
                "position": options.position,
                "width": 200,
                "height": 50,
                "rotation": options.rotation,
                "opacity": WatermarkOptions::normalize_opacity(options.opacity),
                "fontColor": options.font_color,
            }],
            "output": {"type": "pdf"}
        });
        self.client
            .process(&[pdf_file(pdf)], Some("watermark"), &options)
            .await
    }

    pub async fn ocr_pdf(&self, pdf: Bytes, language: &str) -> Result<BinaryDocument> {
        let options = json!({
            "actions": [{"type": "ocr", "language": language}],
            "output": {"type": "pdf"}
        });
        self.client
            .process(&[pdf_file(pdf)], Some("ocr"), &options)
            .await
    }
}

fn pdf_file(data: Bytes) -> UploadedFile {
    UploadedFile::new("document.pdf", PDF_MIME, data)
}
