//! Data models for the application
//!
//! Uploaded files, the operation requested for them, and the per-file and
//! per-batch results returned to clients.

mod file;
mod operation;
mod result;
mod viewer;

pub use file::*;
pub use operation::*;
pub use result::*;
pub use viewer::*;
