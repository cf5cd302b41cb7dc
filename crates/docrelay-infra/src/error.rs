//! HTTP error response body
//!
//! `IntoResponse` for `AppError` lives in the API crate; this crate only owns
//! the wire shape so every service renders errors the same way.

use serde::Serialize;
use utoipa::ToSchema;

/// Standard error envelope: `{success: false, error, message?, code}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub code: String,
    /// Status reported by the external API, for upstream failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: None,
            code: code.into(),
            status: None,
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        self.message = message;
        self
    }

    pub fn with_status(mut self, status: Option<u16>) -> Self {
        self.status = status;
        self
    }
}
