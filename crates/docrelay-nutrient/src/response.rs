//! Responses from the build and sign endpoints
//!
//! A response is kept as a byte stream so it can be piped straight to a client.
//! Callers that need to inspect it buffer it with `UpstreamDocument::into_outcome`.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::pin::Pin;

use bytes::{Bytes, BytesMut};
use docrelay_core::{ExtractedTable, ExtractionData};
use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::error::ApiError;

pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ApiError>> + Send>>;

pub struct UpstreamDocument {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: ByteStream,
}

impl Debug for UpstreamDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("UpstreamDocument")
            .field("content_type", &self.content_type)
            .field("content_disposition", &self.content_disposition)
            .finish_non_exhaustive()
    }
}

/// What a buffered build response turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// A descriptor pointing at a stored document.
    Document { url: String },
    /// JSON without a document descriptor (e.g. inline extraction content).
    Json(Value),
    /// A raw file body.
    Binary { content_type: String, data: Bytes },
}

impl UpstreamDocument {
    /// In-memory response, used by fakes and tests.
    pub fn from_bytes(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            content_type: Some(content_type.into()),
            content_disposition: None,
            body: Box::pin(futures::stream::once(async move { Ok(data) })),
        }
    }

    pub fn json(value: &Value) -> Self {
        Self::from_bytes("application/json", value.to_string())
    }

    pub async fn bytes(mut self) -> Result<Bytes, ApiError> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    pub async fn into_outcome(self) -> Result<BuildOutcome, ApiError> {
        let content_type = self
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = self.bytes().await?;

        if !content_type.to_ascii_lowercase().contains("json") {
            return Ok(BuildOutcome::Binary { content_type, data });
        }

        let value: Value = serde_json::from_slice(&data)
            .map_err(|e| ApiError::InvalidResponse(format!("invalid JSON body: {}", e)))?;

        Ok(match document_url(&value) {
            Some(url) => BuildOutcome::Document { url },
            None => BuildOutcome::Json(value),
        })
    }
}

/// `{"document": "<url>"}` or `{"document": {"url": "<url>"}}`.
fn document_url(value: &Value) -> Option<String> {
    match value.get("document")? {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        Value::Object(doc) => doc
            .get("url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Object(obj) => obj
            .get("content")
            .or_else(|| obj.get("text"))
            .map(cell_text)
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

fn parse_table(value: &Value) -> Option<ExtractedTable> {
    if let Some(headers) = value.get("headers").and_then(Value::as_array) {
        let rows = value
            .get("rows")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(Value::as_array)
                    .map(|row| row.iter().map(cell_text).collect())
                    .collect()
            })
            .unwrap_or_default();
        return Some(ExtractedTable {
            headers: headers.iter().map(cell_text).collect(),
            rows,
        });
    }

    // Cell grid: first row becomes the headers.
    // A grid never has more columns than cells; anything beyond is dropped.
    let cells = value.get("cells").and_then(Value::as_array)?;
    let max_columns = cells.len() as u64;
    let mut grid: BTreeMap<u64, BTreeMap<u64, String>> = BTreeMap::new();
    for cell in cells {
        let row = cell.get("rowIndex").and_then(Value::as_u64)?;
        let column = cell.get("columnIndex").and_then(Value::as_u64)?;
        if column >= max_columns {
            tracing::debug!(column, max_columns, "Skipping out-of-range table cell");
            continue;
        }
        grid.entry(row)
            .or_default()
            .insert(column, cell_text(cell));
    }
    let width = grid
        .values()
        .filter_map(|row| row.keys().max())
        .max()
        .map(|max| *max as usize + 1)
        .unwrap_or(0);
    let mut rows = grid.into_values().map(|row| {
        let mut line = vec![String::new(); width];
        for (column, text) in row {
            line[column as usize] = text;
        }
        line
    });
    let headers = rows.next().unwrap_or_default();
    Some(ExtractedTable {
        headers,
        rows: rows.collect(),
    })
}

fn collect_key_value_pairs(value: &Value, into: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                into.insert(key.clone(), cell_text(v));
            }
        }
        Value::Array(pairs) => {
            for pair in pairs {
                if let (Some(key), Some(v)) = (pair.get("key"), pair.get("value")) {
                    into.insert(cell_text(key), cell_text(v));
                }
            }
        }
        _ => {}
    }
}

/// Parse inline JSON content into extraction data.
///
/// Accepts flat `{text|plainText, tables, keyValuePairs}` objects as well as
/// per-page content under `pages`. Returns `None` when no text is present.
/// Tables and pairs are kept only when requested.
pub fn extraction_from_json(
    value: &Value,
    want_tables: bool,
    want_key_value_pairs: bool,
) -> Option<ExtractionData> {
    let scopes: Vec<&Value> = match value.get("pages").and_then(Value::as_array) {
        Some(pages) if !pages.is_empty() => pages.iter().collect(),
        _ => vec![value],
    };

    let mut texts = Vec::new();
    let mut tables = Vec::new();
    let mut pairs = BTreeMap::new();
    for scope in scopes {
        if let Some(text) = scope
            .get("text")
            .or_else(|| scope.get("plainText"))
            .and_then(Value::as_str)
        {
            texts.push(text.to_string());
        }
        if want_tables {
            if let Some(found) = scope.get("tables").and_then(Value::as_array) {
                tables.extend(found.iter().filter_map(parse_table));
            }
        }
        if want_key_value_pairs {
            if let Some(found) = scope.get("keyValuePairs") {
                collect_key_value_pairs(found, &mut pairs);
            }
        }
    }

    if texts.is_empty() {
        return None;
    }

    Some(ExtractionData {
        text: texts.join("\n"),
        tables,
        key_value_pairs: pairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_descriptor_is_recognized() {
        let doc = UpstreamDocument::json(&json!({"document": "https://docs.example/out.pdf"}));
        assert_eq!(
            doc.into_outcome().await.unwrap(),
            BuildOutcome::Document {
                url: "https://docs.example/out.pdf".to_string()
            }
        );

        let nested = UpstreamDocument::json(&json!({"document": {"url": "https://d/x.pdf"}}));
        assert!(matches!(
            nested.into_outcome().await.unwrap(),
            BuildOutcome::Document { .. }
        ));
    }

    #[tokio::test]
    async fn test_binary_body() {
        let doc = UpstreamDocument::from_bytes("application/pdf", &b"%PDF-1.7"[..]);
        match doc.into_outcome().await.unwrap() {
            BuildOutcome::Binary { content_type, data } => {
                assert_eq!(content_type, "application/pdf");
                assert_eq!(&data[..], b"%PDF-1.7");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_broken_json_is_invalid_response() {
        let doc = UpstreamDocument::from_bytes("application/json", "{oops");
        assert!(matches!(
            doc.into_outcome().await,
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_flat_extraction() {
        let value = json!({
            "text": "Hello",
            "tables": [{"headers": ["A", "B"], "rows": [["1", "2"]]}],
            "keyValuePairs": {"Invoice": "42"}
        });
        let data = extraction_from_json(&value, true, true).unwrap();
        assert_eq!(data.text, "Hello");
        assert_eq!(data.tables[0].headers, vec!["A", "B"]);
        assert_eq!(data.key_value_pairs["Invoice"], "42");

        let text_only = extraction_from_json(&value, false, false).unwrap();
        assert!(text_only.tables.is_empty());
        assert!(text_only.key_value_pairs.is_empty());
    }

    #[test]
    fn test_paged_extraction_with_cell_grid() {
        let value = json!({
            "pages": [
                {
                    "plainText": "Page one",
                    "tables": [{
                        "cells": [
                            {"rowIndex": 0, "columnIndex": 0, "text": "Name"},
                            {"rowIndex": 0, "columnIndex": 1, "text": "Qty"},
                            {"rowIndex": 1, "columnIndex": 0, "text": "Bolt"},
                            {"rowIndex": 1, "columnIndex": 1, "text": "3"}
                        ]
                    }],
                    "keyValuePairs": [{"key": {"content": "Total"}, "value": {"content": "3"}}]
                },
                {"plainText": "Page two"}
            ]
        });
        let data = extraction_from_json(&value, true, true).unwrap();
        assert_eq!(data.text, "Page one\nPage two");
        assert_eq!(data.tables[0].headers, vec!["Name", "Qty"]);
        assert_eq!(data.tables[0].rows, vec![vec!["Bolt", "3"]]);
        assert_eq!(data.key_value_pairs["Total"], "3");
    }

    #[test]
    fn test_out_of_range_columns_are_dropped() {
        let value = json!({
            "text": "t",
            "tables": [{
                "cells": [
                    {"rowIndex": 0, "columnIndex": 0, "text": "Name"},
                    {"rowIndex": 0, "columnIndex": 1, "text": "Qty"},
                    {"rowIndex": 1, "columnIndex": u64::MAX, "text": "bogus"},
                    {"rowIndex": 1, "columnIndex": 1_000_000_000u64, "text": "bogus"},
                    {"rowIndex": 1, "columnIndex": 0, "text": "Bolt"}
                ]
            }]
        });
        let data = extraction_from_json(&value, true, false).unwrap();
        assert_eq!(data.tables[0].headers, vec!["Name", "Qty"]);
        assert_eq!(data.tables[0].rows, vec![vec!["Bolt", ""]]);
    }

    #[test]
    fn test_empty_text_is_still_content() {
        let data = extraction_from_json(&json!({"text": ""}), false, false).unwrap();
        assert_eq!(data.text, "");
    }

    #[test]
    fn test_no_text_is_not_content() {
        assert!(extraction_from_json(&json!({"status": "ok"}), true, true).is_none());
    }
}
