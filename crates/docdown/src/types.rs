//! Value types passed between the guesser, the dispatch engine and converters.

use serde::{Deserialize, Serialize};

/// One hypothesis about a stream's type and provenance.
///
/// Every field is optional and `None` means "unknown". Instances are never
/// updated in place by the library: [`StreamInfo::merge`] and the `with_*`
/// builders always produce a new value.
///
/// Extensions carry their leading dot (`".md"`), matching what
/// [`std::path::Path::extension`] callers usually have to add themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

macro_rules! with_field {
    ($($method:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $method(mut self, value: impl Into<String>) -> Self {
                self.$field = Some(value.into());
                self
            }
        )*
    };
}

impl StreamInfo {
    pub fn new() -> Self {
        Self::default()
    }

    with_field! {
        with_mimetype => mimetype,
        with_extension => extension,
        with_charset => charset,
        with_filename => filename,
        with_local_path => local_path,
        with_url => url,
    }

    /// Apply `overlays` left to right: each field takes the last `Some` value seen.
    ///
    /// Explicit overrides are expressed by chaining `with_*` calls on the
    /// result, which therefore win over every overlay.
    ///
    /// ```rust
    /// use docdown::StreamInfo;
    ///
    /// let base = StreamInfo::new().with_mimetype("text/plain");
    /// let overlay = StreamInfo::new().with_extension(".md");
    /// let merged = base.merge([&overlay]);
    ///
    /// assert_eq!(merged.mimetype.as_deref(), Some("text/plain"));
    /// assert_eq!(merged.extension.as_deref(), Some(".md"));
    /// ```
    pub fn merge<'a>(&self, overlays: impl IntoIterator<Item = &'a StreamInfo>) -> StreamInfo {
        let mut merged = self.clone();
        for overlay in overlays {
            overlay_field(&mut merged.mimetype, &overlay.mimetype);
            overlay_field(&mut merged.extension, &overlay.extension);
            overlay_field(&mut merged.charset, &overlay.charset);
            overlay_field(&mut merged.filename, &overlay.filename);
            overlay_field(&mut merged.local_path, &overlay.local_path);
            overlay_field(&mut merged.url, &overlay.url);
        }
        merged
    }

    /// True when no field is known.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// True when the mimetype or the extension is known.
    pub fn has_type_hint(&self) -> bool {
        self.mimetype.is_some() || self.extension.is_some()
    }

    /// Lowercased extension without its leading dot.
    pub fn bare_extension(&self) -> Option<String> {
        self.extension
            .as_deref()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// Lowercased mimetype without parameters (`text/html; charset=x` -> `text/html`).
    pub fn mime_essence(&self) -> Option<String> {
        self.mimetype.as_deref().map(|mime| {
            mime.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// True when the mimetype starts with any of `prefixes` (case-insensitive).
    pub fn mimetype_starts_with(&self, prefixes: &[&str]) -> bool {
        self.mime_essence()
            .is_some_and(|mime| prefixes.iter().any(|prefix| mime.starts_with(prefix)))
    }

    /// True when the extension is one of `extensions` (given with leading dots).
    pub fn extension_in(&self, extensions: &[&str]) -> bool {
        self.bare_extension().is_some_and(|ext| {
            extensions
                .iter()
                .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
    }
}

fn overlay_field(target: &mut Option<String>, overlay: &Option<String>) {
    if let Some(value) = overlay {
        *target = Some(value.clone());
    }
}

/// Output of one successful conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ConversionResult {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

impl std::fmt::Display for ConversionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.markdown)
    }
}
