//! Text-family input plugin: plain text, Markdown, CSV, JSON and XML.

pub mod csv;

use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::format::DocumentFormat;
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_utils::encoding::decode_text;
use convert_utils::markdown::{fenced, pipe_table};

pub struct TxtInputPlugin;

impl InputPlugin for TxtInputPlugin {
    fn name(&self) -> &str {
        "Text Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[
            DocumentFormat::Txt,
            DocumentFormat::Markdown,
            DocumentFormat::Csv,
            DocumentFormat::Json,
            DocumentFormat::Xml,
        ]
    }

    fn convert(&self, input_path: &Path, ctx: &ExtractContext<'_>) -> Result<String> {
        log::debug!("Reading text: {}", input_path.display());

        let bytes = std::fs::read(input_path)?;
        let text = decode_text(&bytes, ctx.options.input_encoding.as_deref());

        match DocumentFormat::from_path(input_path) {
            Some(DocumentFormat::Csv) => Ok(csv_to_markdown(&text)),
            Some(DocumentFormat::Json) => json_to_markdown(&text, is_json_lines(input_path)),
            Some(DocumentFormat::Xml) => Ok(fenced("xml", &text)),
            _ => Ok(text),
        }
    }
}

fn is_json_lines(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl"))
}

/// Render CSV as a pipe table with the first record as header.
pub fn csv_to_markdown(text: &str) -> String {
    let delimiter = csv::sniff_delimiter(text);
    let rows = csv::parse_csv(text, delimiter);
    pipe_table(&rows)
}

/// Validate and pretty-print JSON (or JSON Lines) inside a code fence.
pub fn json_to_markdown(text: &str, json_lines: bool) -> Result<String> {
    let pretty = if json_lines {
        let mut docs = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: serde_json::Value = serde_json::from_str(line).map_err(|e| {
                ConvertError::Extraction(format!("Invalid JSON on line {}: {}", idx + 1, e))
            })?;
            docs.push(pretty_json(&value)?);
        }
        docs.join("\n")
    } else {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| ConvertError::Extraction(format!("Invalid JSON: {}", e)))?;
        pretty_json(&value)?
    };
    Ok(fenced("json", &pretty))
}

fn pretty_json(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ConvertError::Extraction(e.to_string()))
}
