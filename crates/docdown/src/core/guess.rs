//! Type signal extraction.
//!
//! Produces the ordered list of [`StreamInfo`] guesses fed to dispatch.
//!
//! # Ordering
//!
//! Content classifiers run first and the filename table second, for every
//! entry point. When content sniffing only concludes "some text" and the
//! filename names a textual format, the filename guess replaces the generic
//! one. When both agree on the mimetype they collapse into a single guess.
//!
//! # Stream position
//!
//! The extractor reads a bounded prefix through [`peek`], so the stream is
//! back at its entry position when [`guess`] returns.

use crate::core::config::DetectionConfig;
use crate::core::io::{ReadSeek, peek};
use crate::core::mime::{
    ATOM_MIME_TYPE, HTML_MIME_TYPE, IPYNB_MIME_TYPE, JSON_MIME_TYPE, PLAIN_TEXT_MIME_TYPE, RSS_MIME_TYPE,
    XHTML_MIME_TYPE, XML_MIME_TYPE, charsets_equivalent, detect_charset, extension_for_mime, is_text_mime,
    mime_for_extension,
};
use crate::Result;
use crate::types::StreamInfo;
use encoding_rs::Encoding;
use serde_json::error::Category;
use std::path::Path;

/// How many leading bytes the markup sniffer inspects.
const MARKUP_HEAD_BYTES: usize = 4096;

/// Raw guesses for a stream, most confident first.
///
/// Never fails on malformed content: a stream that defeats every classifier
/// yields at most a filename guess. Only I/O errors propagate.
pub fn guess(
    stream: &mut dyn ReadSeek,
    filename_hint: Option<&str>,
    detection: &DetectionConfig,
) -> Result<Vec<StreamInfo>> {
    let prefix = peek(stream, detection.sniff_bytes)?;

    let content = sniff_content(&prefix);
    let from_name = filename_hint.and_then(guess_from_filename);

    let guesses = match (content, from_name) {
        (Some(content), Some(named)) if is_generic_text(&content) && is_textual(&named) => vec![named],
        (Some(content), Some(named)) if content.mime_essence() == named.mime_essence() => {
            vec![content.merge([&named])]
        }
        (content, named) => content.into_iter().chain(named).collect(),
    };

    let charset_prefix = &prefix[..prefix.len().min(detection.charset_bytes)];
    let charset = if guesses.iter().any(is_textual) {
        detect_charset(charset_prefix)
    } else {
        None
    };

    Ok(guesses
        .into_iter()
        .map(|guess| match &charset {
            Some(charset) if guess.charset.is_none() && is_textual(&guess) => guess.with_charset(charset.as_str()),
            _ => guess,
        })
        .collect())
}

/// Guess from the stream and combine with the caller's hints.
pub fn extract_guesses(
    stream: &mut dyn ReadSeek,
    base: &StreamInfo,
    detection: &DetectionConfig,
) -> Result<Vec<StreamInfo>> {
    let hint = filename_hint(base);
    let raw = guess(stream, hint.as_deref(), detection)?;
    let guesses = build_guesses(base, &raw);
    tracing::debug!(count = guesses.len(), ?guesses, "Built stream guesses");
    Ok(guesses)
}

/// Merge raw guesses with caller-supplied hints.
///
/// The (completed) base hint comes first. A raw guess that agrees with every
/// field the caller set is merged into it, caller fields winning. A raw guess
/// that contradicts the caller is kept as its own candidate, carrying only the
/// caller's provenance fields. Duplicates and empty guesses are dropped.
pub fn build_guesses(base: &StreamInfo, raw: &[StreamInfo]) -> Vec<StreamInfo> {
    let base = complete_base(base);
    let provenance = StreamInfo {
        filename: base.filename.clone(),
        local_path: base.local_path.clone(),
        url: base.url.clone(),
        ..StreamInfo::default()
    };

    let mut guesses = vec![base.clone()];
    let mut base_merged = false;

    for candidate in raw {
        if is_compatible(&base, candidate) {
            let merged = candidate.merge([&base]);
            if base_merged {
                guesses.push(merged);
            } else {
                guesses[0] = merged;
                base_merged = true;
            }
        } else {
            guesses.push(candidate.merge([&provenance]));
        }
    }

    let mut unique: Vec<StreamInfo> = Vec::with_capacity(guesses.len());
    for guess in guesses {
        if !guess.is_empty() && !unique.contains(&guess) {
            unique.push(guess);
        }
    }
    unique
}

/// Fill a missing mimetype from the extension, or the reverse.
fn complete_base(base: &StreamInfo) -> StreamInfo {
    match (&base.mimetype, &base.extension) {
        (None, Some(extension)) => match mime_for_extension(extension) {
            Some(mimetype) => base.clone().with_mimetype(mimetype),
            None => base.clone(),
        },
        (Some(mimetype), None) => match extension_for_mime(mimetype) {
            Some(extension) => base.clone().with_extension(extension),
            None => base.clone(),
        },
        _ => base.clone(),
    }
}

fn is_compatible(base: &StreamInfo, candidate: &StreamInfo) -> bool {
    let mimetype_ok = match (base.mime_essence(), candidate.mime_essence()) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    let extension_ok = match (base.bare_extension(), candidate.bare_extension()) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    let charset_ok = match (&base.charset, &candidate.charset) {
        (Some(a), Some(b)) => charsets_equivalent(a, b),
        _ => true,
    };
    mimetype_ok && extension_ok && charset_ok
}

/// Name to run the extension table on: filename, else the local path or URL
/// basename. A caller extension is appended to a name without one, and with
/// no name at all it goes on a stand-in.
fn filename_hint(info: &StreamInfo) -> Option<String> {
    match (source_name(info), info.bare_extension()) {
        (Some(name), Some(extension)) if Path::new(&name).extension().is_none() => {
            Some(format!("{}.{}", name, extension))
        }
        (None, Some(extension)) => Some(format!("placeholder.{}", extension)),
        (name, _) => name,
    }
}

fn source_name(info: &StreamInfo) -> Option<String> {
    if let Some(filename) = &info.filename {
        return Some(filename.clone());
    }

    if let Some(local_path) = &info.local_path
        && let Some(name) = Path::new(local_path).file_name().and_then(|name| name.to_str())
    {
        return Some(name.to_string());
    }

    info.url.as_deref().and_then(|url| {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        path.rsplit('/').next().filter(|segment| !segment.is_empty()).map(str::to_string)
    })
}

fn guess_from_filename(filename: &str) -> Option<StreamInfo> {
    let extension = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    if extension.is_empty() {
        return None;
    }

    let guess = StreamInfo::new().with_extension(format!(".{}", extension));
    Some(match mime_for_extension(&extension) {
        Some(mimetype) => guess.with_mimetype(mimetype),
        None => guess,
    })
}

/// Content classification with one whitespace-stripped retry, then the text heuristic.
fn sniff_content(prefix: &[u8]) -> Option<StreamInfo> {
    if prefix.is_empty() {
        return None;
    }

    classify(prefix)
        .or_else(|| {
            let trimmed = prefix.trim_ascii_start();
            if trimmed.is_empty() || trimmed.len() == prefix.len() {
                None
            } else {
                classify(trimmed)
            }
        })
        .or_else(|| looks_like_text(prefix).then(|| StreamInfo::new().with_mimetype(PLAIN_TEXT_MIME_TYPE)))
}

fn classify(bytes: &[u8]) -> Option<StreamInfo> {
    sniff_markup(bytes).or_else(|| sniff_magic(bytes))
}

/// Binary signatures only; markup is left to [`sniff_markup`].
fn sniff_magic(bytes: &[u8]) -> Option<StreamInfo> {
    infer::get(bytes)
        .filter(|kind| kind.matcher_type() != infer::MatcherType::Text)
        .map(|kind| {
            StreamInfo::new()
                .with_mimetype(kind.mime_type())
                .with_extension(format!(".{}", kind.extension()))
        })
}

fn typed(mimetype: &str, extension: &str) -> Option<StreamInfo> {
    Some(StreamInfo::new().with_mimetype(mimetype).with_extension(extension))
}

/// Recognize markup and JSON by their opening bytes.
fn sniff_markup(bytes: &[u8]) -> Option<StreamInfo> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(MARKUP_HEAD_BYTES)]).to_ascii_lowercase();

    if head.starts_with("<?xml") || head.starts_with("<rss") || head.starts_with("<feed") {
        return if head.contains("<rss") {
            typed(RSS_MIME_TYPE, ".rss")
        } else if head.contains("<feed") {
            typed(ATOM_MIME_TYPE, ".atom")
        } else if head.contains("<html") {
            typed(XHTML_MIME_TYPE, ".xhtml")
        } else {
            typed(XML_MIME_TYPE, ".xml")
        };
    }

    if head.starts_with("<!doctype html")
        || head.starts_with("<html")
        || (head.starts_with("<!--") && head.contains("<html"))
    {
        return typed(HTML_MIME_TYPE, ".html");
    }

    if head.starts_with('{') && contains(bytes, b"\"nbformat\"") {
        return typed(IPYNB_MIME_TYPE, ".ipynb");
    }

    // Notebooks keep `nbformat` at the end, past the sniff window. Those are
    // left to the notebook converter, which checks the whole stream.
    if (head.starts_with('{') || head.starts_with('[')) && is_json_prefix(bytes) {
        return typed(JSON_MIME_TYPE, ".json");
    }

    None
}

/// Valid JSON, or valid JSON cut short by the sniff window.
fn is_json_prefix(bytes: &[u8]) -> bool {
    match serde_json::from_slice::<serde::de::IgnoredAny>(bytes) {
        Ok(_) => true,
        Err(err) => err.classify() == Category::Eof,
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// No NUL bytes (unless a UTF-16/UTF-8 BOM says otherwise) and few control characters.
fn looks_like_text(bytes: &[u8]) -> bool {
    if Encoding::for_bom(bytes).is_some() {
        return true;
    }
    if bytes.contains(&0) {
        return false;
    }

    let control = bytes
        .iter()
        .filter(|byte| matches!(byte, 0x01..=0x08 | 0x0E..=0x1A | 0x1C..=0x1F | 0x7F))
        .count();
    control * 20 <= bytes.len()
}

fn is_generic_text(info: &StreamInfo) -> bool {
    info.mime_essence().as_deref() == Some(PLAIN_TEXT_MIME_TYPE) && info.extension.is_none()
}

fn is_textual(info: &StreamInfo) -> bool {
    info.mimetype.as_deref().is_some_and(is_text_mime)
}
