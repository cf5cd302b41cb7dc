//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` renders through here, so every failure leaves the
//! relay as the same `{success: false, error, message?, code}` envelope.
//!
//! `HttpAppError` renders without details. `error_envelope_middleware` adds
//! them back outside production and turns bare body-limit rejections into
//! the envelope.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Request, State,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use docrelay_core::{AppError, Config, ErrorMetadata, LogLevel};
use docrelay_infra::ErrorResponse;
use docrelay_nutrient::ApiError;

/// Wrapper so `IntoResponse` can be implemented for the core error type.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ApiError> for HttpAppError {
    fn from(err: ApiError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Body-limit hits surface from the multipart stream with a 413 status.
impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let message = err.body_text();
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            HttpAppError(AppError::PayloadTooLarge(message))
        } else {
            HttpAppError(AppError::UploadRejected(message))
        }
    }
}

/// Requests that never reached `Multipart` (missing or invalid content type).
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        HttpAppError(AppError::UploadRejected(rejection.body_text()))
    }
}

fn log_error(error: &AppError) {
    let code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = code, "Request failed");
        }
    }
}

fn render(app_error: &AppError, hide_details: bool) -> Response {
    let status = StatusCode::from_u16(app_error.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if hide_details || app_error.is_sensitive() {
        None
    } else {
        app_error.detail()
    };
    let upstream_status = match app_error {
        AppError::ExternalApi { status, .. } => Some(*status),
        _ => None,
    };

    let body = ErrorResponse::new(app_error.client_message(), app_error.error_code())
        .with_message(message)
        .with_status(upstream_status);

    (status, Json(body)).into_response()
}

/// The error behind a rendered response, kept for `error_envelope_middleware`.
#[derive(Clone)]
struct RenderedError(Arc<AppError>);

impl HttpAppError {
    /// Render the envelope, hiding details when asked to or when the error is sensitive.
    pub fn to_response(&self, hide_details: bool) -> Response {
        render(&self.0, hide_details)
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.0);
        let mut response = render(&self.0, true);
        response
            .extensions_mut()
            .insert(RenderedError(Arc::new(self.0)));
        response
    }
}

/// How error envelopes are rendered, fixed at startup from `Config`.
#[derive(Debug, Clone, Copy)]
pub struct ErrorRendering {
    pub hide_details: bool,
}

impl ErrorRendering {
    pub fn from_config(config: &Config) -> Self {
        Self {
            hide_details: config.is_production(),
        }
    }
}

/// Must sit outside `RequestBodyLimitLayer`, whose 413 is plain text.
pub async fn error_envelope_middleware(
    State(rendering): State<ErrorRendering>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if let Some(RenderedError(error)) = response.extensions().get::<RenderedError>().cloned() {
        if rendering.hide_details {
            return response;
        }
        return render(&error, false);
    }

    if response.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let error = AppError::PayloadTooLarge("Request body exceeds the upload limit".to_string());
        log_error(&error);
        return render(&error, rendering.hide_details);
    }

    response
}
