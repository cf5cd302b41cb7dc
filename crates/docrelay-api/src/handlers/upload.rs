use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use docrelay_core::OperationRequest;
use docrelay_infra::ErrorResponse;

use crate::error::HttpAppError;
use crate::services::envelope::BatchEnvelope;
use crate::state::AppState;
use crate::utils::multipart::decode_multipart;

/// Run one operation over every uploaded file
///
/// Per-file failures are reported inside `data.files[i].error`; the request
/// itself still succeeds.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Batch processed", body = inline(Object)),
        (status = 400, description = "No files, invalid operation or rejected upload", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<BatchEnvelope, HttpAppError> {
    let form = decode_multipart(multipart?, state.batch_limits()).await?;
    let request = OperationRequest::from_fields(&form.fields)?;

    let outcome = state.aggregator.aggregate(form.files, &request).await?;
    Ok(outcome.into())
}
