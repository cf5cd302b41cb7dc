//! Build instructions sent alongside uploaded files
//!
//! Serialized as the `instructions` multipart part of `/build` and `/sign`
//! requests. Actions run in order; `output` selects the produced format.

use docrelay_core::{AppError, OperationOptions, WatermarkOptions};
use serde::{Deserialize, Serialize};

const WATERMARK_WIDTH: u32 = 200;
const WATERMARK_HEIGHT: u32 = 50;

fn default_watermark_type() -> String {
    "text".to_string()
}

fn default_watermark_width() -> u32 {
    WATERMARK_WIDTH
}

fn default_watermark_height() -> u32 {
    WATERMARK_HEIGHT
}

fn default_opacity() -> f32 {
    WatermarkOptions::default().opacity
}

fn default_font_color() -> String {
    WatermarkOptions::default().font_color
}

fn default_language() -> String {
    OperationOptions::default().language
}

/// Reference from an instruction part to a multipart file part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "watermark", rename_all = "camelCase")]
    Watermark {
        #[serde(default = "default_watermark_type")]
        watermark_type: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<String>,
        #[serde(default = "default_watermark_width")]
        width: u32,
        #[serde(default = "default_watermark_height")]
        height: u32,
        #[serde(default)]
        rotation: i32,
        #[serde(default = "default_opacity")]
        opacity: f32,
        #[serde(default = "default_font_color")]
        font_color: String,
    },
    #[serde(rename = "ocr")]
    Ocr {
        #[serde(default = "default_language")]
        language: String,
    },
    #[serde(rename = "flatten")]
    Flatten {},
    #[serde(rename = "rotate", rename_all = "camelCase")]
    Rotate { rotate_by: i32 },
}

impl Action {
    pub fn text_watermark(options: &WatermarkOptions) -> Self {
        Action::Watermark {
            watermark_type: default_watermark_type(),
            text: options.text.clone(),
            position: Some(options.position.clone()),
            width: WATERMARK_WIDTH,
            height: WATERMARK_HEIGHT,
            rotation: options.rotation,
            opacity: WatermarkOptions::normalize_opacity(options.opacity),
            font_color: options.font_color.clone(),
        }
    }

    pub fn ocr(language: impl Into<String>) -> Self {
        Action::Ocr {
            language: language.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Output {
    #[serde(rename = "pdf")]
    Pdf {},
    #[serde(rename = "pdfa")]
    PdfA {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conformance: Option<String>,
    },
    #[serde(rename = "json-content", rename_all = "camelCase")]
    JsonContent {
        #[serde(default)]
        plain_text: bool,
        #[serde(default)]
        tables: bool,
        #[serde(default)]
        key_value_pairs: bool,
        #[serde(default = "default_language")]
        language: String,
    },
    #[serde(rename = "image")]
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dpi: Option<u32>,
    },
    #[serde(rename = "docx")]
    Docx {},
    #[serde(rename = "xlsx")]
    Xlsx {},
    #[serde(rename = "pptx")]
    Pptx {},
}

impl Output {
    pub fn pdf() -> Self {
        Output::Pdf {}
    }

    /// Inline JSON content with plain text and the optional tables and key-value pairs.
    pub fn json_content(options: &OperationOptions) -> Self {
        Output::JsonContent {
            plain_text: true,
            tables: options.extract_tables,
            key_value_pairs: options.extract_key_value_pairs,
            language: options.language.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Output>,
}

impl Instructions {
    /// Instructions referencing the given multipart file parts in order.
    pub fn for_parts<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: names
                .into_iter()
                .map(|name| Part { file: name.into() })
                .collect(),
            actions: Vec::new(),
            output: None,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Client-supplied `options` field of the streaming process endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessOptions {
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub output: Option<Output>,
}

impl ProcessOptions {
    /// Parse the raw field. Missing or blank means no actions and PDF output.
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let mut options = match raw.map(str::trim).filter(|v| !v.is_empty()) {
            None => ProcessOptions::default(),
            Some(json) => serde_json::from_str::<ProcessOptions>(json)
                .map_err(|e| AppError::InvalidOptions(e.to_string()))?,
        };
        if options.output.is_none() {
            options.output = Some(Output::pdf());
        }
        Ok(options)
    }

    pub fn into_instructions<I, S>(self, part_names: I) -> Instructions
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut instructions = Instructions::for_parts(part_names);
        instructions.actions = self.actions;
        instructions.output = self.output;
        instructions
    }
}
