//! Plain text, Markdown and JSON passthrough.

use crate::Result;
use crate::core::config::ConversionConfig;
use crate::core::io::{ReadSeek, read_to_end};
use crate::plugins::{Acceptance, DocumentConverter, PRIORITY_GENERIC_FILE_FORMAT, Plugin};
use crate::text::safe_decode;
use crate::types::{ConversionResult, StreamInfo};

const ACCEPTED_EXTENSIONS: &[&str] = &[".txt", ".text", ".md", ".markdown", ".json", ".jsonl"];

const ACCEPTED_MIME_PREFIXES: &[&str] = &["text/", "application/json", "application/markdown"];

/// Decodes text using the guessed charset.
///
/// Registered in the generic band so that format-specific converters for
/// text-based formats (CSV, notebooks) are tried first.
pub struct PlainTextConverter;

impl PlainTextConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PlainTextConverter {
    fn name(&self) -> &str {
        "plain-text-converter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Passes plain text, Markdown and JSON through unchanged"
    }
}

impl DocumentConverter for PlainTextConverter {
    fn accepts(&self, _stream: &mut dyn ReadSeek, info: &StreamInfo, _config: &ConversionConfig) -> Acceptance {
        // A known charset means something already decided this is text.
        let text_like = info.charset.is_some()
            || info.extension_in(ACCEPTED_EXTENSIONS)
            || info.mimetype_starts_with(ACCEPTED_MIME_PREFIXES);
        text_like.into()
    }

    fn convert(
        &self,
        stream: &mut dyn ReadSeek,
        info: &StreamInfo,
        _config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let bytes = read_to_end(stream)?;
        Ok(ConversionResult::new(safe_decode(&bytes, info.charset.as_deref())))
    }

    fn priority(&self) -> f64 {
        PRIORITY_GENERIC_FILE_FORMAT
    }

    fn supported_extensions(&self) -> &[&str] {
        ACCEPTED_EXTENSIONS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn accepts(info: StreamInfo) -> Acceptance {
        PlainTextConverter::new().accepts(&mut Cursor::new(Vec::new()), &info, &ConversionConfig::default())
    }

    #[test]
    fn test_accepts_text_types() {
        assert_eq!(accepts(StreamInfo::new().with_extension(".MD")), Acceptance::Accept);
        assert_eq!(accepts(StreamInfo::new().with_mimetype("text/x-rst")), Acceptance::Accept);
        assert_eq!(accepts(StreamInfo::new().with_mimetype("application/json")), Acceptance::Accept);
        assert_eq!(accepts(StreamInfo::new().with_charset("utf-8")), Acceptance::Accept);
    }

    #[test]
    fn test_declines_binary_types() {
        assert_eq!(accepts(StreamInfo::new().with_extension(".zip")), Acceptance::Decline);
        assert_eq!(accepts(StreamInfo::new().with_mimetype("image/png")), Acceptance::Decline);
        assert_eq!(accepts(StreamInfo::new()), Acceptance::Decline);
    }

    #[test]
    fn test_convert_uses_declared_charset() {
        let converter = PlainTextConverter::new();
        let info = StreamInfo::new().with_charset("windows-1252");
        let result = converter
            .convert(&mut Cursor::new(b"caf\xE9".to_vec()), &info, &ConversionConfig::default())
            .unwrap();
        assert_eq!(result.markdown, "café");
        assert_eq!(result.title, None);
    }
}
