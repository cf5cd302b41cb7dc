//! Batch aggregation
//!
//! Runs the dispatcher over every file of a request and collects the results
//! in input order together with the batch summary.

use docrelay_core::{AppError, BatchOutcome, BatchSummary, OperationRequest, UploadedFile};
use futures::stream::{self, StreamExt};

use super::dispatch::Dispatcher;

#[derive(Debug, Clone)]
pub struct Aggregator {
    dispatcher: Dispatcher,
    concurrency: usize,
}

impl Aggregator {
    /// `concurrency` is the number of files in flight at once; 1 is sequential.
    pub fn new(dispatcher: Dispatcher, concurrency: usize) -> Self {
        Self {
            dispatcher,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn aggregate(
        &self,
        files: Vec<UploadedFile>,
        request: &OperationRequest,
    ) -> Result<BatchOutcome, AppError> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No files provided".to_string()));
        }

        let concurrency = self.concurrency.min(files.len());
        let results: Vec<_> = stream::iter(files)
            .map(|file| {
                let dispatcher = self.dispatcher.clone();
                let request = request.clone();
                async move { dispatcher.dispatch(&file, &request).await }
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut summary = BatchSummary::new(request.operation);
        for result in &results {
            summary.record(result);
        }

        tracing::info!(
            total_files = summary.total_files,
            total_size = summary.total_size,
            failed = results.iter().filter(|r| r.is_error()).count(),
            operation = %request.operation,
            "Batch processed"
        );

        Ok(BatchOutcome {
            files: results,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use docrelay_core::{FileOutcome, Operation};
    use docrelay_nutrient::test_helpers::{FakeDocumentApi, FakeFallback, FakeReply};
    use serde_json::json;
    use std::sync::Arc;

    fn aggregator(api: FakeDocumentApi, concurrency: usize) -> (Aggregator, Arc<FakeDocumentApi>) {
        let api = Arc::new(api);
        let dispatcher = Dispatcher::new(api.clone(), Arc::new(FakeFallback));
        (Aggregator::new(dispatcher, concurrency), api)
    }

    fn pdf(name: &str, len: usize) -> UploadedFile {
        UploadedFile::new(name, "application/pdf", Bytes::from(vec![b'x'; len]))
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected_before_dispatch() {
        let (aggregator, api) = aggregator(FakeDocumentApi::replying(FakeReply::document()), 1);
        let err = aggregator
            .aggregate(Vec::new(), &OperationRequest::new(Operation::Extract))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(ref msg) if msg == "No files provided"));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_summary_counts_and_sizes() {
        let (aggregator, _) = aggregator(
            FakeDocumentApi::replying(FakeReply::Json(json!({"text": "t"}))),
            1,
        );
        let files = vec![pdf("a.pdf", 3), pdf("b.pdf", 5), pdf("c.pdf", 0)];

        let outcome = aggregator
            .aggregate(files, &OperationRequest::new(Operation::Extract))
            .await
            .unwrap();

        assert_eq!(outcome.summary.total_files, 3);
        assert_eq!(outcome.summary.total_size, 8);
        assert_eq!(outcome.summary.operation, Operation::Extract);
        assert_eq!(outcome.message(), "Successfully processed 3 file(s)");
    }

    #[tokio::test]
    async fn test_failed_file_does_not_affect_others() {
        let (aggregator, _) = aggregator(
            FakeDocumentApi::replying(FakeReply::Json(json!({"text": "fine"})))
                .with_reply_for("broken.pdf", FakeReply::Status(500)),
            1,
        );
        let files = vec![pdf("a.pdf", 1), pdf("broken.pdf", 1), pdf("c.pdf", 1)];

        let outcome = aggregator
            .aggregate(files, &OperationRequest::new(Operation::Extract))
            .await
            .unwrap();

        let failed: Vec<_> = outcome.failed_files().map(|f| f.filename.as_str()).collect();
        assert_eq!(failed, vec!["broken.pdf"]);
        assert!(!outcome.files[1].error().unwrap_or_default().is_empty());
        assert!(matches!(outcome.files[0].outcome, FileOutcome::Extraction { .. }));
        assert!(matches!(outcome.files[2].outcome, FileOutcome::Extraction { .. }));
    }

    #[tokio::test]
    async fn test_order_is_preserved_with_concurrency() {
        let (aggregator, _) = aggregator(
            FakeDocumentApi::replying(FakeReply::Json(json!({"text": "t"}))),
            4,
        );
        let names: Vec<String> = (0..5).map(|i| format!("f{}.pdf", i)).collect();
        let files = names.iter().map(|n| pdf(n, 1)).collect();

        let outcome = aggregator
            .aggregate(files, &OperationRequest::new(Operation::Extract))
            .await
            .unwrap();

        let got: Vec<_> = outcome.files.iter().map(|f| f.filename.clone()).collect();
        assert_eq!(got, names);
    }

    #[tokio::test]
    async fn test_aggregation_runs_on_spawned_task() {
        let (aggregator, _) = aggregator(
            FakeDocumentApi::replying(FakeReply::Json(json!({"text": "t"}))),
            2,
        );
        let request = OperationRequest::new(Operation::Extract);

        let outcome = tokio::spawn(async move {
            aggregator
                .aggregate(vec![pdf("a.pdf", 1), pdf("b.pdf", 2)], &request)
                .await
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(outcome.summary.total_files, 2);
        assert_eq!(outcome.files[1].filename, "b.pdf");
    }
}
