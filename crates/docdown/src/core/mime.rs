//! MIME type tables and charset detection.
//!
//! Extension lookups consult a static table first and fall back to
//! `mime_guess`. Charset detection looks for a BOM, then checks UTF-8
//! validity, then asks `chardetng`.

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";
pub const HTML_MIME_TYPE: &str = "text/html";
pub const XHTML_MIME_TYPE: &str = "application/xhtml+xml";
pub const CSV_MIME_TYPE: &str = "text/csv";
pub const JSON_MIME_TYPE: &str = "application/json";
pub const JSONL_MIME_TYPE: &str = "application/jsonl";
pub const XML_MIME_TYPE: &str = "application/xml";
pub const XML_TEXT_MIME_TYPE: &str = "text/xml";
pub const RSS_MIME_TYPE: &str = "application/rss+xml";
pub const ATOM_MIME_TYPE: &str = "application/atom+xml";
pub const IPYNB_MIME_TYPE: &str = "application/x-ipynb+json";
pub const ZIP_MIME_TYPE: &str = "application/zip";
pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const YAML_MIME_TYPE: &str = "application/x-yaml";
pub const TOML_MIME_TYPE: &str = "application/toml";

pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PPTX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const EPUB_MIME_TYPE: &str = "application/epub+zip";
pub const MSG_MIME_TYPE: &str = "application/vnd.ms-outlook";

/// Extension (without dot, lowercase) to MIME type.
static EXT_TO_MIME: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("txt", PLAIN_TEXT_MIME_TYPE);
    m.insert("text", PLAIN_TEXT_MIME_TYPE);
    m.insert("log", PLAIN_TEXT_MIME_TYPE);
    m.insert("md", MARKDOWN_MIME_TYPE);
    m.insert("markdown", MARKDOWN_MIME_TYPE);
    m.insert("rst", "text/x-rst");

    m.insert("html", HTML_MIME_TYPE);
    m.insert("htm", HTML_MIME_TYPE);
    m.insert("xhtml", XHTML_MIME_TYPE);

    m.insert("csv", CSV_MIME_TYPE);
    m.insert("tsv", "text/tab-separated-values");
    m.insert("json", JSON_MIME_TYPE);
    m.insert("jsonl", JSONL_MIME_TYPE);
    m.insert("ipynb", IPYNB_MIME_TYPE);
    m.insert("yaml", YAML_MIME_TYPE);
    m.insert("yml", YAML_MIME_TYPE);
    m.insert("toml", TOML_MIME_TYPE);

    m.insert("xml", XML_MIME_TYPE);
    m.insert("rss", RSS_MIME_TYPE);
    m.insert("atom", ATOM_MIME_TYPE);

    m.insert("zip", ZIP_MIME_TYPE);
    m.insert("pdf", PDF_MIME_TYPE);
    m.insert("docx", DOCX_MIME_TYPE);
    m.insert("xlsx", XLSX_MIME_TYPE);
    m.insert("xls", "application/vnd.ms-excel");
    m.insert("pptx", PPTX_MIME_TYPE);
    m.insert("epub", EPUB_MIME_TYPE);
    m.insert("msg", MSG_MIME_TYPE);

    m.insert("png", "image/png");
    m.insert("jpg", "image/jpeg");
    m.insert("jpeg", "image/jpeg");
    m.insert("gif", "image/gif");
    m.insert("webp", "image/webp");
    m.insert("mp3", "audio/mpeg");
    m.insert("wav", "audio/x-wav");
    m.insert("m4a", "audio/mp4");
    m.insert("mp4", "video/mp4");

    m
});

/// Extension reported for a MIME type that several extensions map to.
const PREFERRED_EXTENSIONS: &[(&str, &str)] = &[
    (PLAIN_TEXT_MIME_TYPE, "txt"),
    (MARKDOWN_MIME_TYPE, "md"),
    (HTML_MIME_TYPE, "html"),
    (YAML_MIME_TYPE, "yaml"),
    ("image/jpeg", "jpg"),
];

/// MIME types outside `text/*` whose payload is still text.
const TEXTUAL_APPLICATION_TYPES: &[&str] = &[
    JSON_MIME_TYPE,
    JSONL_MIME_TYPE,
    XML_MIME_TYPE,
    YAML_MIME_TYPE,
    TOML_MIME_TYPE,
    "application/csv",
    "application/markdown",
    "application/javascript",
    "application/x-sh",
];

/// Look up the MIME type for an extension (with or without leading dot).
pub fn mime_for_extension(extension: &str) -> Option<String> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    if ext.is_empty() {
        return None;
    }

    if let Some(mime_type) = EXT_TO_MIME.get(ext.as_str()) {
        return Some(mime_type.to_string());
    }

    mime_guess::from_ext(&ext).first().map(|mime| mime.essence_str().to_string())
}

/// Preferred extension (with leading dot) for a MIME type.
pub fn extension_for_mime(mime_type: &str) -> Option<String> {
    let essence = mime_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    if let Some((_, ext)) = PREFERRED_EXTENSIONS.iter().find(|(mime, _)| *mime == essence) {
        return Some(format!(".{}", ext));
    }

    let mut known: Vec<&str> = EXT_TO_MIME
        .iter()
        .filter(|(_, mime)| **mime == essence)
        .map(|(ext, _)| *ext)
        .collect();
    known.sort_unstable();
    if let Some(ext) = known.first() {
        return Some(format!(".{}", ext));
    }

    mime_guess::get_mime_extensions_str(&essence)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{}", ext))
}

/// True when a MIME type denotes textual content.
pub fn is_text_mime(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence.starts_with("text/")
        || essence.ends_with("+xml")
        || essence.ends_with("+json")
        || TEXTUAL_APPLICATION_TYPES.contains(&essence.as_str())
}

/// Best guess at the encoding of `bytes`.
///
/// A BOM wins. Valid UTF-8 (a sequence cut off at the very end is tolerated,
/// since callers often pass a bounded prefix) is UTF-8. Anything else is
/// handed to `chardetng`.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    match std::str::from_utf8(bytes) {
        Ok(_) => return UTF_8,
        Err(err) if err.error_len().is_none() => return UTF_8,
        Err(_) => {}
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Charset name for `bytes`, or `None` for an empty buffer.
pub fn detect_charset(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    Some(detect_encoding(bytes).name().to_string())
}

/// True when two charset labels name the same encoding.
pub fn charsets_equivalent(a: &str, b: &str) -> bool {
    match (
        Encoding::for_label(a.trim().as_bytes()),
        Encoding::for_label(b.trim().as_bytes()),
    ) {
        (Some(left), Some(right)) => left == right,
        _ => a.trim().eq_ignore_ascii_case(b.trim()),
    }
}
