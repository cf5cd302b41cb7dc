//! Docrelay Infrastructure Library
//!
//! Shared infrastructure for the relay server:
//! - Middleware (request ID, CORS)
//! - Telemetry initialization
//! - Error response body

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

// Re-export commonly used types
#[cfg(feature = "middleware")]
pub use middleware::{cors_middleware, get_request_id, request_id_middleware, RequestId};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry};

pub use error::ErrorResponse;
