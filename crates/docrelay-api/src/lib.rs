//! Docrelay API Library
//!
//! HTTP handlers, services and application setup for the document relay.

mod api_doc;
pub mod constants;
mod handlers;
pub mod services;
pub mod setup;
mod utils;

pub mod error;
pub mod state;

pub use error::HttpAppError;
pub use state::AppState;
