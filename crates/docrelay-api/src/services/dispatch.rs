//! Per-file operation dispatcher
//!
//! Turns one uploaded file plus the batch's operation into exactly one
//! `FileResult`. Every failure is recorded on the result; nothing here returns
//! an error to the caller.

use std::sync::Arc;

use docrelay_core::{
    FileOutcome, FileResult, Operation, OperationOptions, OperationRequest, ProcessedDocument,
    UploadedFile, WatermarkOptions,
};
use docrelay_nutrient::{
    extraction_from_json, Action, ApiError, BuildOutcome, DocumentApi, Endpoint, FallbackKind,
    FallbackProvider, FilePart, Instructions, Output,
};

/// Multipart part name referenced by per-file instructions.
pub(crate) const INPUT_PART: &str = "input";

const MSG_CONVERTED: &str = "Successfully converted to PDF";
const MSG_CONVERTED_DEMO: &str = "Successfully converted to PDF (Demo)";
const MSG_PDF_PASSTHROUGH_DEMO: &str = "PDF file processed successfully (Demo)";
const MSG_WATERMARKED: &str = "Watermark added successfully";
const MSG_WATERMARKED_DEMO: &str = "Watermark added successfully (Demo)";
const MSG_EXTRACTED: &str = "Text extraction completed";
const MSG_OCR: &str = "OCR processing completed";

#[derive(Debug, Clone)]
pub struct Dispatcher {
    api: Arc<dyn DocumentApi>,
    fallback: Arc<dyn FallbackProvider>,
}

impl Dispatcher {
    pub fn new(api: Arc<dyn DocumentApi>, fallback: Arc<dyn FallbackProvider>) -> Self {
        Self { api, fallback }
    }

    pub async fn dispatch(&self, file: &UploadedFile, request: &OperationRequest) -> FileResult {
        tracing::info!(
            file = %file.name,
            size = file.size,
            mimetype = %file.content_type,
            operation = %request.operation,
            "Dispatching file"
        );

        let result = match request.operation {
            Operation::Extract => self.extract(file, &request.options).await,
            Operation::Convert => self.convert(file).await,
            Operation::Watermark => self.watermark(file, &request.options.watermark).await,
            Operation::Ocr => self.ocr(file, &request.options.language).await,
        };

        if let Some(error) = result.error() {
            tracing::warn!(file = %file.name, error = %error, "File processing failed");
        }
        result
    }

    async fn submit(
        &self,
        file: &UploadedFile,
        instructions: &Instructions,
    ) -> Result<BuildOutcome, ApiError> {
        let document = self
            .api
            .submit(
                Endpoint::Build,
                instructions,
                vec![FilePart::from_upload(INPUT_PART, file)],
            )
            .await?;
        document.into_outcome().await
    }

    async fn extract(&self, file: &UploadedFile, options: &OperationOptions) -> FileResult {
        let instructions =
            Instructions::for_parts([INPUT_PART]).with_output(Output::json_content(options));

        match self.submit(file, &instructions).await {
            Ok(BuildOutcome::Json(value)) => {
                match extraction_from_json(
                    &value,
                    options.extract_tables,
                    options.extract_key_value_pairs,
                ) {
                    Some(data) => FileResult::new(file, Operation::Extract, data.into())
                        .with_message(MSG_EXTRACTED),
                    None => FileResult::failed(file, Operation::Extract, "Text extraction failed"),
                }
            }
            Ok(BuildOutcome::Document { .. }) => {
                let data = self.fallback.extraction(file, options);
                FileResult::new(file, Operation::Extract, data.into()).with_message(MSG_EXTRACTED)
            }
            Ok(BuildOutcome::Binary { .. }) => {
                FileResult::failed(file, Operation::Extract, "Text extraction failed")
            }
            Err(e) => FileResult::failed(
                file,
                Operation::Extract,
                format!("Text extraction failed: {}", e.reason()),
            ),
        }
    }

    async fn convert(&self, file: &UploadedFile) -> FileResult {
        if file.is_pdf() {
            let document = self.fallback.document(FallbackKind::Converted);
            return FileResult::new(
                file,
                Operation::Convert,
                FileOutcome::Converted {
                    converted_pdf: document,
                },
            )
            .with_message(MSG_PDF_PASSTHROUGH_DEMO);
        }

        if !file.is_office_document() {
            return FileResult::failed(
                file,
                Operation::Convert,
                format!("Unsupported file type for conversion: {}", file.content_type),
            );
        }

        let instructions = Instructions::for_parts([INPUT_PART]).with_output(Output::pdf());
        match self.publish(file, &instructions, FallbackKind::Converted).await {
            Ok((document, live)) => FileResult::new(
                file,
                Operation::Convert,
                FileOutcome::Converted {
                    converted_pdf: document,
                },
            )
            .with_message(if live { MSG_CONVERTED } else { MSG_CONVERTED_DEMO }),
            Err(e) => processing_failed(file, Operation::Convert, &e),
        }
    }

    async fn watermark(&self, file: &UploadedFile, options: &WatermarkOptions) -> FileResult {
        if !file.is_pdf() {
            return FileResult::failed(
                file,
                Operation::Watermark,
                "Watermark requires a PDF input",
            );
        }

        let instructions = Instructions::for_parts([INPUT_PART])
            .with_action(Action::text_watermark(options))
            .with_output(Output::pdf());
        match self
            .publish(file, &instructions, FallbackKind::Watermarked)
            .await
        {
            Ok((document, live)) => FileResult::new(
                file,
                Operation::Watermark,
                FileOutcome::Watermarked {
                    watermarked_pdf: document,
                },
            )
            .with_message(if live {
                MSG_WATERMARKED
            } else {
                MSG_WATERMARKED_DEMO
            }),
            Err(e) => processing_failed(file, Operation::Watermark, &e),
        }
    }

    async fn ocr(&self, file: &UploadedFile, language: &str) -> FileResult {
        if !file.is_pdf() {
            return FileResult::failed(file, Operation::Ocr, "OCR requires a PDF input");
        }

        let instructions = Instructions::for_parts([INPUT_PART])
            .with_action(Action::ocr(language))
            .with_output(Output::pdf());

        match self.submit(file, &instructions).await {
            Ok(BuildOutcome::Document { .. }) => ocr_completed(file),
            Ok(BuildOutcome::Binary { content_type, .. })
                if content_type.to_ascii_lowercase().contains("pdf") =>
            {
                ocr_completed(file)
            }
            Ok(_) => FileResult::failed(file, Operation::Ocr, "OCR processing failed"),
            Err(e) => processing_failed(file, Operation::Ocr, &e),
        }
    }

    /// Build a PDF and open a viewer session for it.
    ///
    /// Returns the document and whether it is live. Without a document
    /// descriptor the fallback document is returned; a failed session request
    /// on a live document falls back to the demo session only.
    async fn publish(
        &self,
        file: &UploadedFile,
        instructions: &Instructions,
        kind: FallbackKind,
    ) -> Result<(ProcessedDocument, bool), ApiError> {
        let url = match self.submit(file, instructions).await? {
            BuildOutcome::Document { url } => url,
            _ => {
                tracing::info!(file = %file.name, "No document descriptor returned, using demo result");
                return Ok((self.fallback.document(kind), false));
            }
        };

        let session = match self.api.create_viewer_session(&url).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    file = %file.name,
                    error = %e,
                    "Viewer session creation failed, using demo session"
                );
                self.fallback.session(kind)
            }
        };

        Ok((ProcessedDocument::new(url, session), true))
    }
}

fn ocr_completed(file: &UploadedFile) -> FileResult {
    FileResult::new(
        file,
        Operation::Ocr,
        FileOutcome::Ocr {
            ocr_result: format!("OCR processing completed for {}", file.name),
        },
    )
    .with_message(MSG_OCR)
}

fn processing_failed(file: &UploadedFile, operation: Operation, error: &ApiError) -> FileResult {
    FileResult::failed(
        file,
        operation,
        format!("Processing failed: {}", error.reason()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use docrelay_nutrient::test_helpers::{FakeDocumentApi, FakeFallback, FakeReply};
    use serde_json::json;

    fn pdf() -> UploadedFile {
        UploadedFile::new("a.pdf", "application/pdf", Bytes::from_static(b"%PDF-1.7"))
    }

    fn docx() -> UploadedFile {
        UploadedFile::new(
            "letter.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            Bytes::from_static(b"PK\x03\x04"),
        )
    }

    fn dispatcher(api: FakeDocumentApi) -> (Dispatcher, Arc<FakeDocumentApi>) {
        let api = Arc::new(api);
        (Dispatcher::new(api.clone(), Arc::new(FakeFallback)), api)
    }

    fn request(operation: Operation) -> OperationRequest {
        OperationRequest::new(operation)
    }

    #[tokio::test]
    async fn test_extract_inline_content() {
        let (dispatcher, api) = dispatcher(FakeDocumentApi::replying(FakeReply::Json(json!({
            "text": "Quarterly report",
            "tables": [{"headers": ["Q"], "rows": [["1"]]}]
        }))));
        let mut req = request(Operation::Extract);
        req.options.extract_tables = true;

        let result = dispatcher.dispatch(&pdf(), &req).await;

        match &result.outcome {
            FileOutcome::Extraction {
                extracted_text,
                tables,
                ..
            } => {
                assert_eq!(extracted_text, "Quarterly report");
                assert_eq!(tables.len(), 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        let submitted = api.submitted();
        assert_eq!(submitted.len(), 1);
        assert_eq!(
            serde_json::to_value(&submitted[0].output).unwrap()["type"],
            "json-content"
        );
    }

    #[tokio::test]
    async fn test_extract_descriptor_uses_fallback() {
        let (dispatcher, _) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let result = dispatcher.dispatch(&pdf(), &request(Operation::Extract)).await;
        match result.outcome {
            FileOutcome::Extraction { extracted_text, .. } => {
                assert_eq!(extracted_text, "fallback text for a.pdf")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_failure_is_recorded() {
        let (dispatcher, _) = dispatcher(FakeDocumentApi::replying(FakeReply::Transport));
        let result = dispatcher.dispatch(&pdf(), &request(Operation::Extract)).await;
        let error = result.error().unwrap();
        assert!(error.starts_with("Text extraction failed: "));
    }

    #[tokio::test]
    async fn test_extract_unusable_success_is_recorded() {
        let (dispatcher, _) =
            dispatcher(FakeDocumentApi::replying(FakeReply::Json(json!({"ok": true}))));
        let result = dispatcher.dispatch(&pdf(), &request(Operation::Extract)).await;
        assert_eq!(result.error(), Some("Text extraction failed"));
    }

    #[tokio::test]
    async fn test_extract_is_stable_across_runs() {
        let (dispatcher, _) = dispatcher(FakeDocumentApi::replying(FakeReply::Json(
            json!({"text": "same"}),
        )));
        let first = dispatcher.dispatch(&pdf(), &request(Operation::Extract)).await;
        let second = dispatcher.dispatch(&pdf(), &request(Operation::Extract)).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_convert_office_document_live() {
        let (dispatcher, api) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let result = dispatcher.dispatch(&docx(), &request(Operation::Convert)).await;

        assert_eq!(result.message.as_deref(), Some(MSG_CONVERTED));
        match result.outcome {
            FileOutcome::Converted { converted_pdf } => {
                assert_eq!(converted_pdf.url, FakeReply::DOCUMENT_URL);
                assert_eq!(converted_pdf.session_id, "live-session");
                assert!(converted_pdf.viewer_url.starts_with("https://"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(api.session_requests(), vec![FakeReply::DOCUMENT_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_convert_session_failure_uses_demo_session() {
        let (dispatcher, _) = dispatcher(
            FakeDocumentApi::replying(FakeReply::document()).with_failing_sessions(),
        );
        let result = dispatcher.dispatch(&docx(), &request(Operation::Convert)).await;

        assert_eq!(result.message.as_deref(), Some(MSG_CONVERTED));
        match result.outcome {
            FileOutcome::Converted { converted_pdf } => {
                assert_eq!(converted_pdf.url, FakeReply::DOCUMENT_URL);
                assert_eq!(converted_pdf.session_id, "fallback-converted");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_convert_without_descriptor_uses_demo_document() {
        let (dispatcher, api) = dispatcher(FakeDocumentApi::replying(FakeReply::Json(json!({}))));
        let result = dispatcher.dispatch(&docx(), &request(Operation::Convert)).await;
        assert_eq!(result.message.as_deref(), Some(MSG_CONVERTED_DEMO));
        assert!(matches!(result.outcome, FileOutcome::Converted { .. }));
        assert!(api.session_requests().is_empty());
    }

    #[tokio::test]
    async fn test_convert_pdf_makes_no_call() {
        let (dispatcher, api) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let result = dispatcher.dispatch(&pdf(), &request(Operation::Convert)).await;
        assert_eq!(result.message.as_deref(), Some(MSG_PDF_PASSTHROUGH_DEMO));
        assert!(api.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_convert_unsupported_type() {
        let (dispatcher, api) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let image = UploadedFile::new("x.png", "image/png", Bytes::from_static(b"\x89PNG"));
        let result = dispatcher.dispatch(&image, &request(Operation::Convert)).await;
        assert_eq!(
            result.error(),
            Some("Unsupported file type for conversion: image/png")
        );
        assert!(api.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_convert_upstream_error_is_recorded() {
        let (dispatcher, _) = dispatcher(FakeDocumentApi::replying(FakeReply::Status(500)));
        let result = dispatcher.dispatch(&docx(), &request(Operation::Convert)).await;
        assert!(result.error().unwrap().starts_with("Processing failed: HTTP 500"));
    }

    #[tokio::test]
    async fn test_watermark_sends_action() {
        let (dispatcher, api) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let mut req = request(Operation::Watermark);
        req.options.watermark.text = "DRAFT".to_string();

        let result = dispatcher.dispatch(&pdf(), &req).await;

        assert_eq!(result.message.as_deref(), Some(MSG_WATERMARKED));
        assert!(matches!(result.outcome, FileOutcome::Watermarked { .. }));
        let submitted = api.submitted();
        let action = serde_json::to_value(&submitted[0].actions[0]).unwrap();
        assert_eq!(action["type"], "watermark");
        assert_eq!(action["text"], "DRAFT");
        assert_eq!(action["width"], 200);
    }

    #[tokio::test]
    async fn test_watermark_demo_fallback() {
        let (dispatcher, _) = dispatcher(FakeDocumentApi::replying(FakeReply::Json(json!({}))));
        let result = dispatcher.dispatch(&pdf(), &request(Operation::Watermark)).await;
        assert_eq!(result.message.as_deref(), Some(MSG_WATERMARKED_DEMO));
        match result.outcome {
            FileOutcome::Watermarked { watermarked_pdf } => {
                assert_eq!(watermarked_pdf.session_id, "fallback-watermarked")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_watermark_requires_pdf() {
        let (dispatcher, api) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let result = dispatcher.dispatch(&docx(), &request(Operation::Watermark)).await;
        assert_eq!(result.error(), Some("Watermark requires a PDF input"));
        assert!(api.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_ocr_outcomes() {
        let (stored, _) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let result = stored.dispatch(&pdf(), &request(Operation::Ocr)).await;
        assert_eq!(
            result.outcome,
            FileOutcome::Ocr {
                ocr_result: "OCR processing completed for a.pdf".to_string()
            }
        );

        let (binary, _) = dispatcher(FakeDocumentApi::replying(FakeReply::Pdf));
        let result = binary.dispatch(&pdf(), &request(Operation::Ocr)).await;
        assert!(matches!(result.outcome, FileOutcome::Ocr { .. }));

        let (unusable, _) = dispatcher(FakeDocumentApi::replying(FakeReply::Json(json!({}))));
        let result = unusable.dispatch(&pdf(), &request(Operation::Ocr)).await;
        assert_eq!(result.error(), Some("OCR processing failed"));

        let (rejecting, api) = dispatcher(FakeDocumentApi::replying(FakeReply::document()));
        let result = rejecting.dispatch(&docx(), &request(Operation::Ocr)).await;
        assert!(result.is_error());
        assert!(api.submitted().is_empty());
    }
}
