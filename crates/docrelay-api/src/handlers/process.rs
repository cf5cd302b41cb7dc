use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::Response;
use docrelay_core::{AppError, UploadedFile};
use docrelay_infra::ErrorResponse;
use docrelay_nutrient::{Endpoint, FilePart, ProcessOptions};

use crate::error::HttpAppError;
use crate::services::envelope::passthrough;
use crate::state::AppState;
use crate::utils::multipart::decode_multipart;

/// Forward files with caller-supplied actions and stream the result back
#[utoipa::path(
    post,
    path = "/api/process",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Processed document", content_type = "application/octet-stream"),
        (status = 400, description = "No files, invalid options or rejected upload", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart))]
pub async fn process_documents(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let form = decode_multipart(multipart?, state.batch_limits()).await?;
    if form.files.is_empty() {
        return Err(AppError::BadRequest("No files provided".to_string()).into());
    }

    let options = ProcessOptions::parse(form.field("options"))?;
    let endpoint = Endpoint::for_operation(form.field("operation"));

    let parts = file_parts(&form.files);
    let instructions = options.into_instructions(parts.iter().map(|p| p.name.clone()));

    tracing::info!(
        endpoint = endpoint.path(),
        file_count = parts.len(),
        "Forwarding documents"
    );

    let document = state.api.submit(endpoint, &instructions, parts).await?;
    Ok(passthrough(document))
}

/// One part per file, named after the file. Blank or repeated names get `file_{i}`.
fn file_parts(files: &[UploadedFile]) -> Vec<FilePart> {
    let mut used = HashSet::new();
    files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let name = if file.name.is_empty() || used.contains(&file.name) {
                format!("file_{}", i)
            } else {
                file.name.clone()
            };
            used.insert(name.clone());
            FilePart::from_upload(name, file)
        })
        .collect()
}
