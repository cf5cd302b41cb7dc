//! Client for the Nutrient document web services
//!
//! Build and sign submissions, viewer sessions, and the demo fallback used when
//! the service yields no usable document.

pub mod api;
pub mod client;
pub mod error;
pub mod fallback;
pub mod instructions;
pub mod response;
pub mod viewer;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use api::{DocumentApi, Endpoint, FilePart};
pub use client::NutrientClient;
pub use error::ApiError;
pub use fallback::{DemoFallback, FallbackKind, FallbackProvider};
pub use instructions::{Action, Instructions, Output, Part, ProcessOptions};
pub use response::{extraction_from_json, BuildOutcome, ByteStream, UpstreamDocument};
pub use viewer::ViewerSession;
