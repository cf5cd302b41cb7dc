//! Docrelay Core Library
//!
//! This crate provides the domain models, error types and configuration shared
//! by the relay server, the external document API client and the add-in client.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{Config, DemoConfig, LimitsConfig, NutrientConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    BatchOutcome, BatchSummary, ExtractedTable, ExtractionData, FileOutcome, FileResult,
    Operation, OperationOptions, OperationRequest, ProcessedDocument, UploadedFile,
    ViewerSession, WatermarkOptions,
};
