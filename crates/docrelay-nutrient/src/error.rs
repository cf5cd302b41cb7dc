use docrelay_core::AppError;

/// Failure talking to the external document API.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The API answered with a non-success status.
    #[error("Nutrient API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Timeout, connection failure or an interrupted body stream.
    #[error("Request to Nutrient API failed: {0}")]
    Transport(String),

    /// A success response that could not be understood.
    #[error("Unexpected response from Nutrient API: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Short reason suitable for a per-file error message.
    pub fn reason(&self) -> String {
        match self {
            ApiError::Upstream { status, body } if body.is_empty() => format!("HTTP {}", status),
            ApiError::Upstream { status, body } => format!("HTTP {} - {}", status, body),
            ApiError::Transport(msg) | ApiError::InvalidResponse(msg) => msg.clone(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport(format!("request timed out: {}", err))
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Upstream { status, body } => AppError::ExternalApi { status, body },
            other => AppError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrelay_core::ErrorMetadata;

    #[test]
    fn test_upstream_maps_to_external_api_error() {
        let err: AppError = ApiError::Upstream {
            status: 401,
            body: "invalid api key".to_string(),
        }
        .into();
        assert_eq!(err.http_status_code(), 401);
        assert_eq!(err.client_message(), "Nutrient API Error");
    }

    #[test]
    fn test_transport_maps_to_internal() {
        let err: AppError = ApiError::Transport("connection refused".to_string()).into();
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn test_reason() {
        assert_eq!(
            ApiError::Upstream {
                status: 500,
                body: String::new()
            }
            .reason(),
            "HTTP 500"
        );
        assert_eq!(
            ApiError::Transport("timed out".to_string()).reason(),
            "timed out"
        );
    }
}
