//! CSV to Markdown table.

use crate::core::config::ConversionConfig;
use crate::core::io::{ReadSeek, read_to_end};
use crate::plugins::{Acceptance, DocumentConverter, PRIORITY_SPECIFIC_FILE_FORMAT, Plugin};
use crate::text::safe_decode;
use crate::types::{ConversionResult, StreamInfo};
use crate::{DocdownError, Result};

const ACCEPTED_EXTENSIONS: &[&str] = &[".csv"];
const ACCEPTED_MIME_PREFIXES: &[&str] = &["text/csv", "application/csv"];

/// Renders the first record as the header row.
///
/// Data rows are padded with empty cells or truncated to the header width.
pub struct CsvConverter;

impl CsvConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for CsvConverter {
    fn name(&self) -> &str {
        "csv-converter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Converts CSV files to Markdown tables"
    }
}

impl DocumentConverter for CsvConverter {
    fn accepts(&self, _stream: &mut dyn ReadSeek, info: &StreamInfo, _config: &ConversionConfig) -> Acceptance {
        (info.extension_in(ACCEPTED_EXTENSIONS) || info.mimetype_starts_with(ACCEPTED_MIME_PREFIXES)).into()
    }

    fn convert(
        &self,
        stream: &mut dyn ReadSeek,
        info: &StreamInfo,
        _config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let bytes = read_to_end(stream)?;
        let content = safe_decode(&bytes, info.charset.as_deref());
        Ok(ConversionResult::new(csv_to_markdown(&content)?))
    }

    fn priority(&self) -> f64 {
        PRIORITY_SPECIFIC_FILE_FORMAT
    }

    fn supported_extensions(&self) -> &[&str] {
        ACCEPTED_EXTENSIONS
    }
}

/// Parse `content` as CSV and render it as a Markdown table.
pub fn csv_to_markdown(content: &str) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DocdownError::parsing_with_source("Failed to parse CSV", e))?;
        rows.push(record.iter().map(escape_cell).collect());
    }

    let Some((header, body)) = rows.split_first() else {
        return Ok(String::new());
    };

    let width = header.len();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(table_row(header));
    lines.push(table_row(&vec!["---".to_string(); width]));

    for row in body {
        let mut cells: Vec<String> = row.iter().take(width).cloned().collect();
        cells.resize(width, String::new());
        lines.push(table_row(&cells));
    }

    Ok(lines.join("\n"))
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn table_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}
