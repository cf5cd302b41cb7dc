use crate::host::HostError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The relay answered with a failure envelope.
    #[error("API request failed with status {status}: {error}")]
    Request {
        status: u16,
        error: String,
        message: Option<String>,
    },

    #[error("Failed to reach the relay: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Host(#[from] HostError),
}
