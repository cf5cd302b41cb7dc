//! OpenAPI documentation

use utoipa::OpenApi;

use crate::handlers;
use crate::services::envelope::ExtractionEnvelope;
use docrelay_core::models;
use docrelay_infra::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docrelay API",
        version = "0.1.0",
        description = "Relay between document add-ins and the Nutrient Document Web Services API. Upload files for extraction, conversion, watermarking or OCR, or forward raw build instructions."
    ),
    paths(
        handlers::upload::upload_documents,
        handlers::extract::extract_document,
        handlers::process::process_documents,
        handlers::health::health_check,
    ),
    components(schemas(
        ErrorResponse,
        ExtractionEnvelope,
        handlers::health::HealthResponse,
        models::BatchSummary,
        models::ExtractedTable,
        models::ExtractionData,
        models::Operation,
        models::ProcessedDocument,
    )),
    tags(
        (name = "documents", description = "Document processing"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let spec = get_openapi_spec();
        for path in ["/api/upload", "/api/extract", "/api/process", "/api/health"] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
