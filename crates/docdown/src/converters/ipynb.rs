//! Jupyter Notebook (.ipynb) converter.
//!
//! Markdown cells are copied as-is, code cells become fenced blocks tagged
//! with the kernel language, raw cells become untagged fenced blocks. The
//! title is `metadata.title` when present, otherwise the first `# ` heading
//! of a markdown cell.

use crate::core::config::ConversionConfig;
use crate::core::io::{ReadSeek, peek, read_to_end};
use crate::core::mime::IPYNB_MIME_TYPE;
use crate::plugins::{Acceptance, DocumentConverter, PRIORITY_SPECIFIC_FILE_FORMAT, Plugin};
use crate::text::safe_decode;
use crate::types::{ConversionResult, StreamInfo};
use crate::{DocdownError, Result};
use serde_json::Value;

const ACCEPTED_EXTENSIONS: &[&str] = &[".ipynb"];
const CANDIDATE_MIME_PREFIXES: &[&str] = &["application/json"];

const DEFAULT_LANGUAGE: &str = "python";

pub struct IpynbConverter;

impl IpynbConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for IpynbConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for IpynbConverter {
    fn name(&self) -> &str {
        "ipynb-converter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Converts Jupyter notebooks to Markdown"
    }
}

impl DocumentConverter for IpynbConverter {
    fn accepts(&self, stream: &mut dyn ReadSeek, info: &StreamInfo, _config: &ConversionConfig) -> Acceptance {
        if info.extension_in(ACCEPTED_EXTENSIONS) || info.mimetype_starts_with(&[IPYNB_MIME_TYPE]) {
            return Acceptance::Accept;
        }

        if info.mimetype_starts_with(CANDIDATE_MIME_PREFIXES) {
            // Plain JSON: only a notebook if it carries the format markers.
            return match peek(stream, usize::MAX) {
                Ok(bytes) => {
                    let text = safe_decode(&bytes, info.charset.as_deref());
                    (text.contains("nbformat") && text.contains("nbformat_minor")).into()
                }
                Err(_) => Acceptance::Decline,
            };
        }

        Acceptance::Decline
    }

    fn convert(
        &self,
        stream: &mut dyn ReadSeek,
        info: &StreamInfo,
        _config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let bytes = read_to_end(stream)?;
        let content = safe_decode(&bytes, info.charset.as_deref());
        let notebook: Value = serde_json::from_str(&content)
            .map_err(|e| DocdownError::parsing_with_source("Error converting .ipynb file: invalid JSON", e))?;

        notebook_to_markdown(&notebook)
    }

    fn priority(&self) -> f64 {
        PRIORITY_SPECIFIC_FILE_FORMAT
    }

    fn supported_extensions(&self) -> &[&str] {
        ACCEPTED_EXTENSIONS
    }
}

fn notebook_to_markdown(notebook: &Value) -> Result<ConversionResult> {
    let cells = match notebook.get("cells") {
        None => &[][..],
        Some(Value::Array(cells)) => cells.as_slice(),
        Some(_) => return Err(DocdownError::parsing("Error converting .ipynb file: 'cells' is not a list")),
    };

    let language = notebook
        .pointer("/metadata/language_info/name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);

    let mut blocks = Vec::with_capacity(cells.len());
    let mut heading = None;

    for cell in cells {
        let source = cell_source(cell);
        match cell.get("cell_type").and_then(Value::as_str).unwrap_or_default() {
            "markdown" => {
                if heading.is_none() {
                    heading = source
                        .lines()
                        .find(|line| line.starts_with("# "))
                        .map(|line| line.trim_start_matches(['#', ' ']).trim().to_string());
                }
                blocks.push(source);
            }
            "code" => blocks.push(format!("```{}\n{}\n```", language, source)),
            "raw" => blocks.push(format!("```\n{}\n```", source)),
            _ => {}
        }
    }

    let title = notebook
        .pointer("/metadata/title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(heading);

    Ok(ConversionResult::new(blocks.join("\n\n")).with_title(title))
}

/// Cell source is either a single string or a list of lines.
fn cell_source(cell: &Value) -> String {
    match cell.get("source") {
        Some(Value::String(source)) => source.clone(),
        Some(Value::Array(lines)) => lines.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}
