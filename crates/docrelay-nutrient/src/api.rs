//! Abstraction over the external document API
//!
//! The relay only depends on this trait, so request handling can be exercised
//! against an in-process fake instead of the real service.

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use docrelay_core::{UploadedFile, ViewerSession};

use crate::error::ApiError;
use crate::instructions::Instructions;
use crate::response::UpstreamDocument;

/// Processing endpoint to submit to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Build,
    Sign,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Build => "/build",
            Endpoint::Sign => "/sign",
        }
    }

    /// `sign` goes to the signing endpoint, everything else is a build.
    pub fn for_operation(operation: Option<&str>) -> Self {
        match operation.map(str::trim) {
            Some(op) if op.eq_ignore_ascii_case("sign") => Endpoint::Sign,
            _ => Endpoint::Build,
        }
    }
}

/// One binary part of a multipart submission.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Multipart field name; referenced from `Instructions::parts`.
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl FilePart {
    pub fn from_upload(name: impl Into<String>, file: &UploadedFile) -> Self {
        Self {
            name: name.into(),
            filename: file.name.clone(),
            content_type: file.content_type.clone(),
            data: file.data.clone(),
        }
    }
}

#[async_trait]
pub trait DocumentApi: Send + Sync + Debug {
    /// Submit files with instructions. Non-success statuses are returned as errors.
    async fn submit(
        &self,
        endpoint: Endpoint,
        instructions: &Instructions,
        files: Vec<FilePart>,
    ) -> Result<UpstreamDocument, ApiError>;

    /// Open a viewer session for a stored document.
    async fn create_viewer_session(&self, document_url: &str) -> Result<ViewerSession, ApiError>;
}
