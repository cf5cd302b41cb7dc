//! Shared pieces of the `docrelay` command-line client.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use docrelay_client::host::{DocumentHost, HostError, DEFAULT_DOCUMENT_NAME};

/// Treats a local file as the open document and an output file as the selection.
///
/// Without an output file the "selection" is stdout.
#[derive(Debug, Clone)]
pub struct FileHost {
    document: PathBuf,
    selection: Option<PathBuf>,
}

impl FileHost {
    pub fn new(document: impl Into<PathBuf>, selection: Option<PathBuf>) -> Self {
        Self {
            document: document.into(),
            selection,
        }
    }

    pub fn document_path(&self) -> &Path {
        &self.document
    }
}

#[async_trait]
impl DocumentHost for FileHost {
    async fn document_bytes(&self) -> Result<Vec<u8>, HostError> {
        tokio::fs::read(&self.document).await.map_err(|e| {
            let detail = format!("{}: {}", self.document.display(), e);
            match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    HostError::FileUnavailable(detail)
                }
                _ => HostError::SliceFailed(detail),
            }
        })
    }

    async fn replace_selection(&self, text: &str) -> Result<(), HostError> {
        match &self.selection {
            Some(path) => tokio::fs::write(path, text)
                .await
                .map_err(|e| HostError::WriteFailed(format!("{}: {}", path.display(), e))),
            None => {
                println!("{}", text);
                Ok(())
            }
        }
    }

    fn document_name(&self) -> String {
        self.document
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_DOCUMENT_NAME.to_string())
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
