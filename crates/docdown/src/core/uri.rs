//! `file:` and `data:` URI parsing, and hint extraction from HTTP responses.

use crate::types::StreamInfo;
use crate::{DocdownError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

static DISPOSITION_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"filename=([^;]+)").expect("Content-Disposition regex pattern is valid"));

/// Split a `file:` URI into its host (if any) and local path.
///
/// # Errors
///
/// `Validation` if the URI does not parse or is not a `file:` URI.
pub fn file_uri_to_path(uri: &str) -> Result<(Option<String>, PathBuf)> {
    let parsed = Url::parse(uri).map_err(|e| DocdownError::validation_with_source(format!("Invalid URI: {}", uri), e))?;
    if parsed.scheme() != "file" {
        return Err(DocdownError::validation(format!("Not a file URL: {}", uri)));
    }

    let host = parsed.host_str().filter(|host| !host.is_empty()).map(str::to_string);
    let decoded = percent_decode_str(parsed.path()).decode_utf8_lossy().into_owned();
    Ok((host, PathBuf::from(decoded)))
}

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mimetype: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub data: Vec<u8>,
}

impl DataUri {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Parse `data:[<mediatype>][;key=value]*[;base64],<payload>`.
///
/// No mimetype is assumed when the header omits one.
///
/// # Errors
///
/// `Validation` when the prefix or the `,` separator is missing, or the
/// base64 payload is malformed.
///
/// # Example
///
/// ```rust
/// use docdown::core::uri::parse_data_uri;
///
/// let uri = parse_data_uri("data:text/plain;charset=utf-8;base64,SGVsbG8=")?;
/// assert_eq!(uri.mimetype.as_deref(), Some("text/plain"));
/// assert_eq!(uri.attribute("charset"), Some("utf-8"));
/// assert_eq!(uri.data, b"Hello");
/// # Ok::<(), docdown::DocdownError>(())
/// ```
pub fn parse_data_uri(uri: &str) -> Result<DataUri> {
    let rest = uri
        .split_once(':')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("data"))
        .map(|(_, rest)| rest)
        .ok_or_else(|| DocdownError::validation("Not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DocdownError::validation("Malformed data URI, missing ',' separator"))?;

    let mut parts: Vec<&str> = header.split(';').collect();
    let is_base64 = parts.last() == Some(&"base64");
    if is_base64 {
        parts.pop();
    }

    let mut parts = parts.into_iter().peekable();
    let mimetype = parts
        .next_if(|first| !first.is_empty() && !first.contains('='))
        .map(str::to_string);

    let mut attributes = BTreeMap::new();
    for part in parts {
        match part.split_once('=') {
            Some((key, value)) => {
                attributes.insert(key.to_string(), value.to_string());
            }
            None if !part.is_empty() => {
                attributes.insert(part.to_string(), String::new());
            }
            None => {}
        }
    }

    let data = if is_base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| DocdownError::validation_with_source("Malformed base64 payload in data URI", e))?
    } else {
        percent_decode_str(payload).collect()
    };

    Ok(DataUri {
        mimetype,
        attributes,
        data,
    })
}

/// A response body with the headers that carry type hints.
#[derive(Debug, Clone, Default)]
pub struct FetchedResponse {
    /// Final URL after redirects.
    pub url: String,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

/// Build the base guess for an HTTP response.
///
/// The mimetype and charset come from `Content-Type`. The filename comes from
/// `Content-Disposition`, or failing that from the last URL path segment when
/// it has an extension.
pub fn stream_info_from_response(url: &str, content_type: Option<&str>, content_disposition: Option<&str>) -> StreamInfo {
    let mut info = StreamInfo::new().with_url(url);

    if let Some(content_type) = content_type {
        let mut parts = content_type.split(';');
        if let Some(mimetype) = parts.next().map(str::trim).filter(|m| !m.is_empty()) {
            info.mimetype = Some(mimetype.to_string());
        }
        for part in parts {
            if let Some(charset) = part.trim().strip_prefix("charset=") {
                let charset = charset.trim().trim_matches(|c| c == '"' || c == '\'');
                if !charset.is_empty() {
                    info.charset = Some(charset.to_string());
                }
            }
        }
    }

    if let Some(caps) = content_disposition.and_then(|header| DISPOSITION_FILENAME.captures(header)) {
        let filename = caps[1].trim().trim_matches(|c| c == '"' || c == '\'');
        if !filename.is_empty() {
            info.filename = Some(filename.to_string());
            info.extension = extension_of(filename);
        }
    }

    if info.filename.is_none()
        && let Ok(parsed) = Url::parse(url)
        && let Some(segment) = parsed.path_segments().and_then(|mut segments| segments.next_back())
    {
        let segment = percent_decode_str(segment).decode_utf8_lossy().into_owned();
        if let Some(extension) = extension_of(&segment) {
            info.filename = Some(segment);
            info.extension = Some(extension);
        }
    }

    info
}

/// `.ext` of a file name, if it has one.
pub(crate) fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{}", ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_uri_to_path() {
        let (host, path) = file_uri_to_path("file:///tmp/report%20final.csv").unwrap();
        assert_eq!(host, None);
        assert_eq!(path, PathBuf::from("/tmp/report final.csv"));

        let (host, _) = file_uri_to_path("file://fileserver/share/a.txt").unwrap();
        assert_eq!(host.as_deref(), Some("fileserver"));
    }

    #[test]
    fn test_file_uri_rejects_other_schemes() {
        assert!(file_uri_to_path("https://example.com/a.txt").is_err());
        assert!(file_uri_to_path("not a uri").is_err());
    }

    #[test]
    fn test_parse_data_uri_plain() {
        let uri = parse_data_uri("data:,Hello%2C%20World").unwrap();
        assert_eq!(uri.mimetype, None);
        assert!(uri.attributes.is_empty());
        assert_eq!(uri.data, b"Hello, World");
    }

    #[test]
    fn test_parse_data_uri_attributes() {
        let uri = parse_data_uri("data:text/csv;charset=latin1;header,a,b").unwrap();
        assert_eq!(uri.mimetype.as_deref(), Some("text/csv"));
        assert_eq!(uri.attribute("charset"), Some("latin1"));
        assert_eq!(uri.attribute("header"), Some(""));
        assert_eq!(uri.data, b"a,b");
    }

    #[test]
    fn test_parse_data_uri_attribute_without_mimetype() {
        let uri = parse_data_uri("data:charset=utf-8,x").unwrap();
        assert_eq!(uri.mimetype, None);
        assert_eq!(uri.attribute("charset"), Some("utf-8"));
    }

    #[test]
    fn test_parse_data_uri_base64() {
        let uri = parse_data_uri("data:;base64,SGk=").unwrap();
        assert_eq!(uri.mimetype, None);
        assert_eq!(uri.data, b"Hi");
    }

    #[test]
    fn test_parse_data_uri_scheme_case_insensitive() {
        let uri = parse_data_uri("DATA:text/plain,hi").unwrap();
        assert_eq!(uri.mimetype.as_deref(), Some("text/plain"));
        assert_eq!(uri.data, b"hi");

        assert!(parse_data_uri("Data;base64,SGk=").is_err());
    }

    #[test]
    fn test_parse_data_uri_errors() {
        assert!(parse_data_uri("text/plain,abc").is_err());
        assert!(parse_data_uri("data:text/plain").is_err());
        assert!(parse_data_uri("data:;base64,***").is_err());
    }

    #[test]
    fn test_stream_info_from_headers() {
        let info = stream_info_from_response(
            "https://example.com/download?id=7",
            Some("text/csv; charset=\"ISO-8859-1\""),
            Some("attachment; filename=\"sales.csv\""),
        );

        assert_eq!(info.mimetype.as_deref(), Some("text/csv"));
        assert_eq!(info.charset.as_deref(), Some("ISO-8859-1"));
        assert_eq!(info.filename.as_deref(), Some("sales.csv"));
        assert_eq!(info.extension.as_deref(), Some(".csv"));
        assert_eq!(info.url.as_deref(), Some("https://example.com/download?id=7"));
    }

    #[test]
    fn test_stream_info_from_url_path() {
        let info = stream_info_from_response("https://example.com/feeds/news.rss", None, None);
        assert_eq!(info.filename.as_deref(), Some("news.rss"));
        assert_eq!(info.extension.as_deref(), Some(".rss"));
        assert_eq!(info.mimetype, None);

        let bare = stream_info_from_response("https://example.com/about", Some("text/html"), None);
        assert_eq!(bare.filename, None);
        assert_eq!(bare.extension, None);
    }
}
