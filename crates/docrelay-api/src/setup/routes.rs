//! Route configuration and setup

use crate::constants::{EXTRACT_PATH, HEALTH_PATH, OPENAPI_PATH, PROCESS_PATH, UPLOAD_PATH};
use crate::error::{error_envelope_middleware, ErrorRendering};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use docrelay_core::Config;
use docrelay_infra::{cors_middleware, request_id_middleware};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Room for multipart boundaries and text fields on top of the file payload.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Build the router. CORS is the outermost layer so `OPTIONS` never reaches a handler.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let http_concurrency_limit = config.limits.http_concurrency_limit.max(1);
    let body_limit = config
        .limits
        .max_file_size_bytes
        .saturating_mul(config.limits.max_files)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        body_limit = body_limit,
        "HTTP limits configured"
    );

    api_routes()
        .with_state(state)
        .route(
            OPENAPI_PATH,
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(axum::middleware::from_fn_with_state(
            ErrorRendering::from_config(config),
            error_envelope_middleware,
        ))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(cors_middleware))
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            UPLOAD_PATH,
            post(handlers::upload::upload_documents).fallback(handlers::method_not_allowed),
        )
        .route(
            EXTRACT_PATH,
            post(handlers::extract::extract_document).fallback(handlers::method_not_allowed),
        )
        .route(
            PROCESS_PATH,
            post(handlers::process::process_documents).fallback(handlers::method_not_allowed),
        )
        .route(HEALTH_PATH, get(handlers::health::health_check))
}
