//! Multipart form decoding with upload limits
//!
//! Limits are checked while the body streams in, so an oversized batch is
//! rejected before anything is dispatched.

use std::collections::HashMap;

use axum::extract::multipart::{Field, Multipart};
use bytes::BytesMut;
use docrelay_core::{AppError, UploadedFile};

use crate::error::HttpAppError;

/// Field names accepted for file parts.
const FILE_FIELDS: [&str; 2] = ["files", "file"];
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_size_bytes: usize,
}

/// Files in arrival order plus every text field.
#[derive(Debug, Default)]
pub struct DecodedForm {
    pub files: Vec<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl DecodedForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Exactly one file, for single-file endpoints.
    pub fn single_file(mut self) -> Result<(UploadedFile, HashMap<String, String>), AppError> {
        match self.files.len() {
            0 => Err(AppError::BadRequest("No file provided".to_string())),
            1 => {
                let file = self.files.remove(0);
                Ok((file, self.fields))
            }
            _ => Err(AppError::UploadRejected("Too many files".to_string())),
        }
    }
}

pub async fn decode_multipart(
    mut multipart: Multipart,
    limits: UploadLimits,
) -> Result<DecodedForm, HttpAppError> {
    let mut form = DecodedForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string).unwrap_or_default();

        if field.file_name().is_none() && !FILE_FIELDS.contains(&name.as_str()) {
            let value = field.text().await?;
            form.fields.insert(name, value);
            continue;
        }

        if !FILE_FIELDS.contains(&name.as_str()) {
            return Err(AppError::UploadRejected(format!("Unexpected field: {}", name)).into());
        }

        if form.files.len() >= limits.max_files {
            return Err(AppError::UploadRejected("Too many files".to_string()).into());
        }

        let file = read_file(field, limits.max_file_size_bytes).await?;
        tracing::debug!(
            file = %file.name,
            size = file.size,
            mimetype = %file.content_type,
            "Received file"
        );
        form.files.push(file);
    }

    Ok(form)
}

async fn read_file(mut field: Field<'_>, max_size: usize) -> Result<UploadedFile, HttpAppError> {
    let name = field
        .file_name()
        .map(str::to_string)
        .unwrap_or_default();
    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let mut data = BytesMut::new();
    while let Some(chunk) = field.chunk().await? {
        if data.len() + chunk.len() > max_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File size exceeds maximum allowed size of {} MB",
                max_size / 1024 / 1024
            ))
            .into());
        }
        data.extend_from_slice(&chunk);
    }

    Ok(UploadedFile::new(name, content_type, data.freeze()))
}
