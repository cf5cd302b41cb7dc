use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use docrelay_core::{AppError, OperationRequest};
use docrelay_infra::ErrorResponse;
use docrelay_nutrient::{extraction_from_json, BuildOutcome, Endpoint, FilePart, Instructions, Output};

use crate::error::HttpAppError;
use crate::services::dispatch::INPUT_PART;
use crate::services::envelope::ExtractionEnvelope;
use crate::state::AppState;
use crate::utils::multipart::decode_multipart;

/// Extract text, tables and key-value pairs from a single document
///
/// Unlike `/api/upload`, a rejection by the external API fails the request
/// with the upstream status.
#[utoipa::path(
    post,
    path = "/api/extract",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Extraction result", body = ExtractionEnvelope),
        (status = 400, description = "Missing file or rejected upload", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn extract_document(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractionEnvelope>, HttpAppError> {
    let form = decode_multipart(multipart?, state.single_file_limits()).await?;
    let (file, mut fields) = form.single_file()?;
    fields.remove("operation");
    let options = OperationRequest::from_fields(&fields)?.options;

    let instructions =
        Instructions::for_parts([INPUT_PART]).with_output(Output::json_content(&options));
    let document = state
        .api
        .submit(
            Endpoint::Build,
            &instructions,
            vec![FilePart::from_upload(INPUT_PART, &file)],
        )
        .await?;

    let data = match document.into_outcome().await? {
        BuildOutcome::Json(value) => extraction_from_json(
            &value,
            options.extract_tables,
            options.extract_key_value_pairs,
        )
        .ok_or_else(|| AppError::Internal("Text extraction failed".to_string()))?,
        BuildOutcome::Document { .. } => state.fallback.extraction(&file, &options),
        BuildOutcome::Binary { content_type, .. } => {
            return Err(AppError::Internal(format!(
                "Text extraction failed: unexpected {} response",
                content_type
            ))
            .into());
        }
    };

    tracing::info!(file = %file.name, size = file.size, "Text extracted");
    Ok(Json(ExtractionEnvelope::new(data)))
}
