use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_WATERMARK_TEXT: &str = "CONFIDENTIAL";
const DEFAULT_WATERMARK_POSITION: &str = "center";
const DEFAULT_WATERMARK_OPACITY: f32 = 0.5;
const DEFAULT_WATERMARK_ROTATION: i32 = 45;
const DEFAULT_WATERMARK_COLOR: &str = "#FF0000";

/// Processing operation applied to every file of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    #[default]
    Extract,
    Convert,
    Watermark,
    Ocr,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Extract,
        Operation::Convert,
        Operation::Watermark,
        Operation::Ocr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Extract => "extract",
            Operation::Convert => "convert",
            Operation::Watermark => "watermark",
            Operation::Ocr => "ocr",
        }
    }

    /// Parse an optional form value; a missing or blank value means `extract`.
    pub fn from_field(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Ok(Operation::default()),
            Some(v) => v.parse(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| {
                AppError::InvalidOperation(format!(
                    "Unknown operation '{}'. Expected one of: extract, convert, watermark, ocr",
                    s
                ))
            })
    }
}

/// Text watermark settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkOptions {
    pub text: String,
    pub position: String,
    /// Always within `0.0..=1.0`.
    pub opacity: f32,
    pub rotation: i32,
    pub font_color: String,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: DEFAULT_WATERMARK_TEXT.to_string(),
            position: DEFAULT_WATERMARK_POSITION.to_string(),
            opacity: DEFAULT_WATERMARK_OPACITY,
            rotation: DEFAULT_WATERMARK_ROTATION,
            font_color: DEFAULT_WATERMARK_COLOR.to_string(),
        }
    }
}

impl WatermarkOptions {
    /// Clamp into range; non-finite values fall back to the default.
    pub fn normalize_opacity(value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(0.0, 1.0)
        } else {
            DEFAULT_WATERMARK_OPACITY
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOptions {
    pub extract_tables: bool,
    pub extract_key_value_pairs: bool,
    pub language: String,
    pub watermark: WatermarkOptions,
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            extract_tables: false,
            extract_key_value_pairs: false,
            language: DEFAULT_LANGUAGE.to_string(),
            watermark: WatermarkOptions::default(),
        }
    }
}

/// Operation plus options, built once per HTTP request from form fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    pub operation: Operation,
    pub options: OperationOptions,
}

fn flag(fields: &HashMap<String, String>, key: &str) -> bool {
    fields
        .get(key)
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn text_or(fields: &HashMap<String, String>, key: &str, default: &str) -> String {
    fields
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl OperationRequest {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            options: OperationOptions::default(),
        }
    }

    /// Build a request from the non-file multipart fields.
    ///
    /// Only `operation` can fail. Unparseable numeric fields fall back to their defaults.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let operation = Operation::from_field(fields.get("operation").map(String::as_str))?;

        let opacity = fields
            .get("watermarkOpacity")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .map(WatermarkOptions::normalize_opacity)
            .unwrap_or(DEFAULT_WATERMARK_OPACITY);
        let rotation = fields
            .get("watermarkRotation")
            .and_then(|v| v.trim().parse::<i32>().ok())
            .unwrap_or(DEFAULT_WATERMARK_ROTATION);

        let options = OperationOptions {
            extract_tables: flag(fields, "extractTables"),
            extract_key_value_pairs: flag(fields, "extractKeyValuePairs"),
            language: text_or(fields, "language", DEFAULT_LANGUAGE),
            watermark: WatermarkOptions {
                text: text_or(fields, "watermarkText", DEFAULT_WATERMARK_TEXT),
                position: text_or(fields, "watermarkPosition", DEFAULT_WATERMARK_POSITION),
                opacity,
                rotation,
                font_color: text_or(fields, "watermarkColor", DEFAULT_WATERMARK_COLOR),
            },
        };

        Ok(Self { operation, options })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_operation_defaults_to_extract() {
        assert_eq!(Operation::from_field(None).unwrap(), Operation::Extract);
        assert_eq!(Operation::from_field(Some("  ")).unwrap(), Operation::Extract);
    }

    #[test]
    fn test_operation_parse_known_values() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert_eq!("OCR".parse::<Operation>().unwrap(), Operation::Ocr);
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let err = "compress".parse::<Operation>().unwrap_err();
        assert!(matches!(err, AppError::InvalidOperation(_)));
        assert!(err.to_string().contains("compress"));
    }

    #[test]
    fn test_operation_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Operation::Watermark).unwrap(),
            "\"watermark\""
        );
    }

    #[test]
    fn test_request_defaults() {
        let request = OperationRequest::from_fields(&HashMap::new()).unwrap();
        assert_eq!(request.operation, Operation::Extract);
        assert!(!request.options.extract_tables);
        assert_eq!(request.options.language, "en");
        assert_eq!(request.options.watermark, WatermarkOptions::default());
    }

    #[test]
    fn test_request_from_fields() {
        let request = OperationRequest::from_fields(&fields(&[
            ("operation", "watermark"),
            ("extractTables", "true"),
            ("extractKeyValuePairs", "false"),
            ("watermarkText", "DRAFT"),
            ("watermarkOpacity", "0.25"),
            ("watermarkRotation", "-30"),
            ("watermarkColor", "#000000"),
            ("language", "de"),
        ]))
        .unwrap();

        assert_eq!(request.operation, Operation::Watermark);
        assert!(request.options.extract_tables);
        assert!(!request.options.extract_key_value_pairs);
        assert_eq!(request.options.language, "de");
        assert_eq!(request.options.watermark.text, "DRAFT");
        assert_eq!(request.options.watermark.opacity, 0.25);
        assert_eq!(request.options.watermark.rotation, -30);
        assert_eq!(request.options.watermark.font_color, "#000000");
    }

    #[test]
    fn test_opacity_is_clamped_and_defaulted() {
        let high = OperationRequest::from_fields(&fields(&[("watermarkOpacity", "7")])).unwrap();
        assert_eq!(high.options.watermark.opacity, 1.0);

        let low = OperationRequest::from_fields(&fields(&[("watermarkOpacity", "-1")])).unwrap();
        assert_eq!(low.options.watermark.opacity, 0.0);

        let junk = OperationRequest::from_fields(&fields(&[("watermarkOpacity", "abc")])).unwrap();
        assert_eq!(junk.options.watermark.opacity, 0.5);

        let nan = OperationRequest::from_fields(&fields(&[("watermarkOpacity", "NaN")])).unwrap();
        assert_eq!(nan.options.watermark.opacity, 0.5);
    }

    #[test]
    fn test_invalid_operation_field_fails() {
        let result = OperationRequest::from_fields(&fields(&[("operation", "shred")]));
        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
    }
}
