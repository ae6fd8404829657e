//! HTML to Markdown through `html-to-markdown-rs`.
//!
//! The library is asked for YAML frontmatter so the document title can be
//! lifted out of it; the frontmatter itself is stripped from the output.
//! Large documents are converted on a thread with a bigger stack.

use crate::core::config::ConversionConfig;
use crate::core::io::{ReadSeek, read_to_end};
use crate::plugins::{Acceptance, DocumentConverter, PRIORITY_GENERIC_FILE_FORMAT, Plugin};
use crate::text::safe_decode;
use crate::types::{ConversionResult, StreamInfo};
use crate::{DocdownError, Result};
use html_to_markdown_rs::{ConversionOptions, PreprocessingOptions, convert as convert_html};
use once_cell::sync::Lazy;
use regex::Regex;
use std::{any::Any, thread};

const ACCEPTED_EXTENSIONS: &[&str] = &[".html", ".htm"];
const ACCEPTED_MIME_PREFIXES: &[&str] = &["text/html", "application/xhtml"];

const LARGE_HTML_STACK_THRESHOLD_BYTES: usize = 512 * 1024;
const HTML_CONVERSION_STACK_SIZE_BYTES: usize = 16 * 1024 * 1024;

static DATA_URI_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\]\((data:[^,)\s]*),[^)\s]*\)").expect("Data URI link regex pattern is valid and should compile")
});
static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("Title tag regex pattern is valid and should compile"));

pub struct HtmlConverter;

impl HtmlConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HtmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for HtmlConverter {
    fn name(&self) -> &str {
        "html-converter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Converts HTML and XHTML documents to Markdown"
    }
}

impl DocumentConverter for HtmlConverter {
    fn accepts(&self, _stream: &mut dyn ReadSeek, info: &StreamInfo, _config: &ConversionConfig) -> Acceptance {
        (info.extension_in(ACCEPTED_EXTENSIONS) || info.mimetype_starts_with(ACCEPTED_MIME_PREFIXES)).into()
    }

    fn convert(
        &self,
        stream: &mut dyn ReadSeek,
        info: &StreamInfo,
        config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let bytes = read_to_end(stream)?;
        let html = safe_decode(&bytes, Some(info.charset.as_deref().unwrap_or("utf-8")));

        let converted = run_conversion(html.clone(), document_options())?;
        let (frontmatter_title, body) = split_frontmatter(&converted)?;
        let title = frontmatter_title.or_else(|| title_from_tag(&html));

        Ok(ConversionResult::new(finish(body, config.keep_data_uris)).with_title(title))
    }

    fn priority(&self) -> f64 {
        PRIORITY_GENERIC_FILE_FORMAT
    }

    fn supported_extensions(&self) -> &[&str] {
        ACCEPTED_EXTENSIONS
    }
}

/// Convert an HTML fragment (no frontmatter, no title).
pub fn html_to_markdown(html: &str, keep_data_uris: bool) -> Result<String> {
    let options = ConversionOptions {
        extract_metadata: false,
        ..document_options()
    };
    let markdown = run_conversion(html.to_string(), options)?;
    Ok(finish(&markdown, keep_data_uris))
}

fn document_options() -> ConversionOptions {
    ConversionOptions {
        extract_metadata: true,
        hocr_spatial_tables: false,
        preprocessing: PreprocessingOptions {
            enabled: false,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn finish(markdown: &str, keep_data_uris: bool) -> String {
    if keep_data_uris {
        markdown.to_string()
    } else {
        truncate_data_uris(markdown)
    }
}

/// `](data:image/png;base64,AAAA...)` becomes `](data:image/png;base64...)`.
fn truncate_data_uris(markdown: &str) -> String {
    DATA_URI_LINK.replace_all(markdown, "](${1}...)").into_owned()
}

fn run_conversion(html: String, options: ConversionOptions) -> Result<String> {
    if html.len() >= LARGE_HTML_STACK_THRESHOLD_BYTES {
        run_on_dedicated_stack(move || convert_with_options(&html, options))
    } else {
        convert_with_options(&html, options)
    }
}

fn convert_with_options(html: &str, options: ConversionOptions) -> Result<String> {
    convert_html(html, Some(options))
        .map_err(|e| DocdownError::parsing(format!("Failed to convert HTML to Markdown: {}", e)))
}

fn run_on_dedicated_stack<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let handle = thread::Builder::new()
        .name("docdown-html-conversion".to_string())
        .stack_size(HTML_CONVERSION_STACK_SIZE_BYTES)
        .spawn(job)
        .map_err(|err| DocdownError::Other(format!("Failed to spawn HTML conversion thread: {}", err)))?;

    match handle.join() {
        Ok(result) => result,
        Err(panic) => {
            let reason = extract_panic_reason(&panic);
            Err(DocdownError::Other(format!("HTML conversion panicked: {}", reason)))
        }
    }
}

fn extract_panic_reason(panic: &Box<dyn Any + Send + 'static>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Split leading YAML frontmatter off `markdown`, returning its `title` and the body.
fn split_frontmatter(markdown: &str) -> Result<(Option<String>, &str)> {
    let Some(after_opening) = markdown
        .strip_prefix("---\n")
        .or_else(|| markdown.strip_prefix("---\r\n"))
    else {
        return Ok((None, markdown));
    };

    let Some(pos) = after_opening
        .find("\n---\n")
        .or_else(|| after_opening.find("\r\n---\r\n"))
    else {
        return Ok((None, markdown));
    };

    let yaml = &after_opening[..pos];
    let body_start = pos + if after_opening[pos..].starts_with("\r\n") { 7 } else { 5 };
    let body = &after_opening[body_start..];

    let value: serde_json::Value = serde_yaml_ng::from_str(yaml)
        .map_err(|e| DocdownError::parsing(format!("Failed to parse YAML frontmatter: {}", e)))?;
    let title = value.get("title").and_then(|title| title.as_str()).and_then(clean_title);

    Ok((title, body))
}

fn title_from_tag(html: &str) -> Option<String> {
    let raw = TITLE_TAG.captures(html)?.get(1)?.as_str();
    clean_title(&decode_entities(raw))
}

/// Collapse whitespace runs; `None` for a blank title.
fn clean_title(raw: &str) -> Option<String> {
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
