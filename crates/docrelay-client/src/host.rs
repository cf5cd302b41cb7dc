//! Capabilities the hosting editor exposes to the add-in workflows

use async_trait::async_trait;

/// Name used for the open document when the host cannot tell.
pub const DEFAULT_DOCUMENT_NAME: &str = "document.docx";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Failed to get document file: {0}")]
    FileUnavailable(String),

    #[error("Failed to get document slice: {0}")]
    SliceFailed(String),

    #[error("Failed to insert text: {0}")]
    WriteFailed(String),

    #[error("Not supported by this host: {0}")]
    Unsupported(String),
}

/// The document currently open in the host, and its selection.
#[async_trait]
pub trait DocumentHost: Send + Sync {
    /// Full contents of the open document.
    async fn document_bytes(&self) -> Result<Vec<u8>, HostError>;

    /// Replace the current selection with plain text.
    async fn replace_selection(&self, text: &str) -> Result<(), HostError>;

    fn document_name(&self) -> String {
        DEFAULT_DOCUMENT_NAME.to_string()
    }
}
