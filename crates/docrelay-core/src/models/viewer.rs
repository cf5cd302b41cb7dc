use serde::{Deserialize, Serialize};

/// A viewer session opened for a processed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerSession {
    pub token: String,
    pub session_id: String,
    pub viewer_url: String,
}

impl ViewerSession {
    /// Session on the live viewer: `{domain}/s/{id}?token={token}`.
    pub fn live(domain: &str, session_id: &str, token: &str) -> Self {
        Self {
            viewer_url: format!(
                "{}/s/{}?token={}",
                domain.trim_end_matches('/'),
                urlencoding::encode(session_id),
                urlencoding::encode(token)
            ),
            token: token.to_string(),
            session_id: session_id.to_string(),
        }
    }
}
