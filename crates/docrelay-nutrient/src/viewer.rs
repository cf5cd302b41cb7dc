use serde::{Deserialize, Serialize};

pub use docrelay_core::ViewerSession;

#[derive(Debug, Serialize)]
pub(crate) struct CreateSessionRequest<'a> {
    pub document: SessionDocument<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionDocument<'a> {
    pub url: &'a str,
}

/// Body of a successful `POST /viewer/sessions`.
#[derive(Debug, Deserialize)]
pub(crate) struct SessionResponse {
    pub token: String,
    pub id: String,
    /// Viewer base URL; the configured viewer domain is used when absent.
    #[serde(default)]
    pub viewer_url: Option<String>,
}

impl SessionResponse {
    pub fn into_session(self, default_domain: &str) -> ViewerSession {
        let domain = self
            .viewer_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(default_domain);
        ViewerSession::live(domain, &self.id, &self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_uses_returned_viewer_url() {
        let response: SessionResponse = serde_json::from_str(
            r#"{"token":"t","id":"s1","viewer_url":"https://viewer.example"}"#,
        )
        .unwrap();
        let session = response.into_session("https://fallback.example");
        assert_eq!(session.viewer_url, "https://viewer.example/s/s1?token=t");
    }

    #[test]
    fn test_session_defaults_to_configured_domain() {
        let response: SessionResponse =
            serde_json::from_str(r#"{"token":"t","id":"s1"}"#).unwrap();
        let session = response.into_session("https://api.example");
        assert_eq!(session.viewer_url, "https://api.example/s/s1?token=t");
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(CreateSessionRequest {
            document: SessionDocument {
                url: "https://d/x.pdf",
            },
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"document": {"url": "https://d/x.pdf"}}));
    }
}
