//! RSS 2.0 and Atom feeds, parsed with `roxmltree`.
//!
//! `.rss`/`.atom` and the feed mimetypes are accepted outright. Generic XML
//! (`.xml`, `text/xml`, `application/xml`) is only accepted after parsing the
//! stream and finding an `<rss>` element, or a `<feed>` with at least one
//! `<entry>`.

use crate::core::config::ConversionConfig;
use crate::core::io::{ReadSeek, peek, read_to_end};
use crate::core::mime::{XML_MIME_TYPE, XML_TEXT_MIME_TYPE};
use crate::plugins::{Acceptance, DocumentConverter, PRIORITY_SPECIFIC_FILE_FORMAT, Plugin};
use crate::text::safe_decode;
use crate::types::{ConversionResult, StreamInfo};
use crate::{DocdownError, Result};
use roxmltree::{Document, Node, ParsingOptions};

const PRECISE_EXTENSIONS: &[&str] = &[".rss", ".atom"];
const PRECISE_MIME_PREFIXES: &[&str] = &["application/rss", "application/atom"];
const CANDIDATE_EXTENSIONS: &[&str] = &[".xml"];
const CANDIDATE_MIME_PREFIXES: &[&str] = &[XML_TEXT_MIME_TYPE, XML_MIME_TYPE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedType {
    Rss,
    Atom,
}

pub struct RssConverter;

impl RssConverter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RssConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for RssConverter {
    fn name(&self) -> &str {
        "rss-converter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Converts RSS and Atom feeds to Markdown"
    }
}

impl DocumentConverter for RssConverter {
    fn accepts(&self, stream: &mut dyn ReadSeek, info: &StreamInfo, _config: &ConversionConfig) -> Acceptance {
        if info.extension_in(PRECISE_EXTENSIONS) || info.mimetype_starts_with(PRECISE_MIME_PREFIXES) {
            return Acceptance::Accept;
        }

        if info.extension_in(CANDIDATE_EXTENSIONS) || info.mimetype_starts_with(CANDIDATE_MIME_PREFIXES) {
            let Ok(bytes) = peek(stream, usize::MAX) else {
                return Acceptance::Decline;
            };
            let xml = safe_decode(&bytes, info.charset.as_deref());
            return parse_feed(&xml)
                .map(|doc| feed_type(&doc).is_some())
                .unwrap_or(false)
                .into();
        }

        Acceptance::Decline
    }

    fn convert(
        &self,
        stream: &mut dyn ReadSeek,
        info: &StreamInfo,
        config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let bytes = read_to_end(stream)?;
        let xml = safe_decode(&bytes, info.charset.as_deref());
        let doc = parse_feed(&xml).map_err(|e| DocdownError::parsing_with_source("Failed to parse feed XML", e))?;

        match feed_type(&doc) {
            Some(FeedType::Rss) => rss_to_markdown(&doc, config),
            Some(FeedType::Atom) => Ok(atom_to_markdown(&doc, config)),
            None => Err(DocdownError::parsing("Unknown feed type")),
        }
    }

    fn priority(&self) -> f64 {
        PRIORITY_SPECIFIC_FILE_FORMAT
    }

    fn supported_extensions(&self) -> &[&str] {
        PRECISE_EXTENSIONS
    }
}

fn parse_feed(xml: &str) -> std::result::Result<Document<'_>, roxmltree::Error> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    Document::parse_with_options(xml.trim_start_matches('\u{feff}'), options)
}

fn feed_type(doc: &Document<'_>) -> Option<FeedType> {
    if find(doc.root(), "rss").is_some() {
        return Some(FeedType::Rss);
    }
    find(doc.root(), "feed")
        .filter(|feed| find(*feed, "entry").is_some())
        .map(|_| FeedType::Atom)
}

/// First descendant element with the given local name.
fn find<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn find_all<'a, 'input>(node: Node<'a, 'input>, name: &'a str) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .skip(1)
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Text of the first matching descendant, if it has any.
fn text_of(node: Node<'_, '_>, name: &str) -> Option<String> {
    find(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn rss_to_markdown(doc: &Document<'_>, config: &ConversionConfig) -> Result<ConversionResult> {
    let channel = find(doc.root(), "rss")
        .and_then(|rss| find(rss, "channel"))
        .ok_or_else(|| DocdownError::parsing("No channel found in RSS feed"))?;

    let title = text_of(channel, "title");
    let mut markdown = String::new();
    if let Some(title) = &title {
        markdown.push_str(&format!("# {}\n", title));
    }
    if let Some(description) = text_of(channel, "description") {
        markdown.push_str(&format!("{}\n", description));
    }

    for item in find_all(channel, "item") {
        if let Some(item_title) = text_of(item, "title") {
            markdown.push_str(&format!("\n## {}\n", item_title));
        }
        if let Some(published) = text_of(item, "pubDate") {
            markdown.push_str(&format!("Published on: {}\n", published));
        }
        if let Some(description) = text_of(item, "description") {
            push_content(&mut markdown, &description, config);
        }
        if let Some(content) = text_of(item, "encoded") {
            push_content(&mut markdown, &content, config);
        }
    }

    Ok(ConversionResult::new(markdown).with_title(title))
}

fn atom_to_markdown(doc: &Document<'_>, config: &ConversionConfig) -> ConversionResult {
    let Some(feed) = find(doc.root(), "feed") else {
        return ConversionResult::new("");
    };

    let title = text_of(feed, "title");
    let mut markdown = format!("# {}\n", title.as_deref().unwrap_or_default());
    if let Some(subtitle) = text_of(feed, "subtitle") {
        markdown.push_str(&format!("{}\n", subtitle));
    }

    for entry in find_all(feed, "entry") {
        if let Some(entry_title) = text_of(entry, "title") {
            markdown.push_str(&format!("\n## {}\n", entry_title));
        }
        if let Some(updated) = text_of(entry, "updated") {
            markdown.push_str(&format!("Updated on: {}\n", updated));
        }
        if let Some(summary) = text_of(entry, "summary") {
            push_content(&mut markdown, &summary, config);
        }
        if let Some(content) = text_of(entry, "content") {
            push_content(&mut markdown, &content, config);
        }
    }

    ConversionResult::new(markdown).with_title(title)
}

/// Feed bodies are usually HTML fragments.
fn push_content(markdown: &mut String, content: &str, config: &ConversionConfig) {
    markdown.push_str(&render_fragment(content, config));
    markdown.push('\n');
}

#[cfg(feature = "html")]
fn render_fragment(content: &str, config: &ConversionConfig) -> String {
    match super::html::html_to_markdown(content, config.keep_data_uris) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(error) => {
            tracing::debug!(%error, "Feed content is not convertible HTML, keeping raw text");
            content.to_string()
        }
    }
}

#[cfg(not(feature = "html"))]
fn render_fragment(content: &str, _config: &ConversionConfig) -> String {
    content.to_string()
}
