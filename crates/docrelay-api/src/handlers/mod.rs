pub mod extract;
pub mod health;
pub mod process;
pub mod upload;

use crate::error::HttpAppError;
use docrelay_core::AppError;

/// Fallback for non-POST methods on processing routes.
pub async fn method_not_allowed() -> HttpAppError {
    HttpAppError(AppError::MethodNotAllowed)
}
