//! Error types module
//!
//! Request-level failures are unified under `AppError`. Failures that belong to
//! a single file of a batch never become an `AppError`; they are recorded on the
//! file's result instead (see `models::FileOutcome::Error`).

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for upstream rejections and other recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "BAD_REQUEST")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Short client-facing error title, rendered as the envelope's `error` field
    fn client_message(&self) -> String;

    /// Longer explanation, rendered as the envelope's `message` field when allowed
    fn detail(&self) -> Option<String>;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Multipart decoding failed or a file count/size limit was exceeded.
    #[error("File upload error: {0}")]
    UploadRejected(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// The external document API answered with a non-success status.
    #[error("External API error ({status}): {body}")]
    ExternalApi { status: u16, body: String },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidOptions(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::UploadRejected(_) => (
            400,
            "UPLOAD_REJECTED",
            false,
            Some("Check the number and size of uploaded files"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidOperation(_) => (
            400,
            "INVALID_OPERATION",
            false,
            Some("Use one of: extract, convert, watermark, ocr"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidOptions(_) => (
            400,
            "INVALID_OPTIONS",
            false,
            Some("Send options as JSON with known action and output types"),
            false,
            LogLevel::Debug,
        ),
        AppError::MethodNotAllowed => (
            405,
            "METHOD_NOT_ALLOWED",
            false,
            Some("Use POST for processing endpoints"),
            false,
            LogLevel::Debug,
        ),
        AppError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size or number of files"),
            false,
            LogLevel::Debug,
        ),
        AppError::ExternalApi { status, .. } => (
            *status,
            "EXTERNAL_API_ERROR",
            *status >= 500 || *status == 429,
            Some("Retry later or check the document and options"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        let status = app_error_static_metadata(self).0;
        // Upstream may send something we cannot express as a response status.
        if (400..=599).contains(&status) {
            status
        } else {
            502
        }
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::UploadRejected(_) => "File upload error".to_string(),
            AppError::InvalidOperation(_) => "Invalid operation".to_string(),
            AppError::InvalidOptions(_) => "Invalid options".to_string(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::PayloadTooLarge(_) => "Payload too large".to_string(),
            AppError::ExternalApi { .. } => "Nutrient API Error".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal Server Error".to_string()
            }
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            AppError::BadRequest(_) | AppError::MethodNotAllowed => None,
            AppError::UploadRejected(ref msg)
            | AppError::InvalidOperation(ref msg)
            | AppError::InvalidOptions(ref msg)
            | AppError::PayloadTooLarge(ref msg)
            | AppError::Internal(ref msg) => Some(msg.clone()),
            AppError::ExternalApi { ref body, .. } => Some(body.clone()),
            AppError::InternalWithSource { message, source } => {
                Some(format!("{}: {:#}", message, source))
            }
        }
    }
}
