//! HTTP client for the Nutrient document web services

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use docrelay_core::{NutrientConfig, ViewerSession};
use futures::TryStreamExt;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE, USER_AGENT};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};

use crate::api::{DocumentApi, Endpoint, FilePart};
use crate::error::ApiError;
use crate::instructions::Instructions;
use crate::response::UpstreamDocument;
use crate::viewer::{CreateSessionRequest, SessionDocument, SessionResponse};

const FALLBACK_PART_MIME: &str = "application/octet-stream";

pub struct NutrientClient {
    http_client: Client,
    config: NutrientConfig,
}

impl Debug for NutrientClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("NutrientClient")
            .field("api_base", &self.config.api_base)
            .finish()
    }
}

impl NutrientClient {
    pub fn new(config: NutrientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client for Nutrient API")?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    fn file_part(file: FilePart) -> Result<Part, ApiError> {
        let FilePart {
            filename,
            content_type,
            data,
            ..
        } = file;
        let make = |bytes: bytes::Bytes| Part::stream(Body::from(bytes)).file_name(filename.clone());

        match make(data.clone()).mime_str(&content_type) {
            Ok(part) => Ok(part),
            Err(_) => make(data)
                .mime_str(FALLBACK_PART_MIME)
                .map_err(|e| ApiError::Transport(format!("invalid multipart part: {}", e))),
        }
    }

    async fn error_from(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        ApiError::Upstream { status, body }
    }
}

#[async_trait]
impl DocumentApi for NutrientClient {
    async fn submit(
        &self,
        endpoint: Endpoint,
        instructions: &Instructions,
        files: Vec<FilePart>,
    ) -> Result<UpstreamDocument, ApiError> {
        let instructions_json = instructions
            .to_json()
            .map_err(|e| ApiError::InvalidResponse(format!("unserializable instructions: {}", e)))?;

        let file_count = files.len();
        let mut form = Form::new().text("instructions", instructions_json);
        for file in files {
            let name = file.name.clone();
            form = form.part(name, Self::file_part(file)?);
        }

        tracing::debug!(
            endpoint = endpoint.path(),
            file_count = file_count,
            action_count = instructions.actions.len(),
            "Submitting documents to Nutrient API"
        );

        let response = self
            .http_client
            .post(self.url(endpoint.path()))
            .bearer_auth(&self.config.processor_api_key)
            .header(USER_AGENT, &self.config.user_agent)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::error_from(response).await;
            tracing::warn!(endpoint = endpoint.path(), error = %err, "Nutrient API rejected request");
            return Err(err);
        }

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE);
        let content_disposition = header(CONTENT_DISPOSITION);

        Ok(UpstreamDocument {
            content_type,
            content_disposition,
            body: Box::pin(response.bytes_stream().map_err(ApiError::from)),
        })
    }

    async fn create_viewer_session(&self, document_url: &str) -> Result<ViewerSession, ApiError> {
        let response = self
            .http_client
            .post(self.url("/viewer/sessions"))
            .bearer_auth(&self.config.viewer_api_key)
            .header(USER_AGENT, &self.config.user_agent)
            .json(&CreateSessionRequest {
                document: SessionDocument { url: document_url },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("invalid viewer session: {}", e)))?;

        tracing::info!(session_id = %session.id, "Viewer session created");

        Ok(session.into_session(&self.config.viewer_domain))
    }
}
