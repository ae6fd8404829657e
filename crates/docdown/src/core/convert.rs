//! Caller-facing entry points.
//!
//! Each entry point derives a base [`StreamInfo`] from what it knows about the
//! source (path, URI, response headers), overlays the caller's hints, extracts
//! guesses from the stream and hands everything to [`DispatchEngine::dispatch`].
//!
//! # Example
//!
//! ```rust,no_run
//! use docdown::{DispatchEngine, StreamInfo};
//!
//! let engine = DispatchEngine::with_builtins()?;
//!
//! let from_file = engine.convert_path("report.csv", &StreamInfo::new())?;
//! let from_uri = engine.convert_uri("data:text/plain;base64,SGVsbG8=", &StreamInfo::new())?;
//! let forced = engine.convert_path("notes.dat", &StreamInfo::new().with_extension(".md"))?;
//!
//! println!("{}\n{}\n{}", from_file, from_uri, forced);
//! # Ok::<(), docdown::DocdownError>(())
//! ```

use crate::core::dispatch::DispatchEngine;
use crate::core::guess::extract_guesses;
use crate::core::io::{ReadSeek, validate_file_exists};
use crate::core::uri::{FetchedResponse, extension_of, file_uri_to_path, parse_data_uri, stream_info_from_response};
use crate::types::{ConversionResult, StreamInfo};
use crate::{DocdownError, Result};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

const URI_SCHEMES: &[&str] = &["file:", "data:", "http:", "https:"];

impl DispatchEngine {
    /// Convert a local path or a `file:`/`data:`/`http(s):` URI.
    pub fn convert(&self, source: &str, hints: &StreamInfo) -> Result<ConversionResult> {
        let lower = source.trim_start().to_ascii_lowercase();
        if URI_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            self.convert_uri(source.trim(), hints)
        } else {
            self.convert_path(source, hints)
        }
    }

    /// Convert a local file.
    ///
    /// The base guess carries the path, file name and extension; `hints`
    /// override any of them.
    ///
    /// # Errors
    ///
    /// `Validation` if the file does not exist, `Io` if it cannot be read,
    /// otherwise the dispatch outcome.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn convert_path(&self, path: impl AsRef<Path>, hints: &StreamInfo) -> Result<ConversionResult> {
        let path = path.as_ref();
        validate_file_exists(path)?;

        let mut base = StreamInfo::new().with_local_path(path.to_string_lossy());
        if let Some(name) = path.file_name().map(|name| name.to_string_lossy().into_owned()) {
            base.extension = extension_of(&name);
            base.filename = Some(name);
        }

        let mut reader = BufReader::new(File::open(path)?);
        self.convert_with_base(&mut reader, base.merge([hints]))
    }

    /// Convert a seekable stream, starting at its current position.
    ///
    /// The stream is left at that position when the call returns.
    pub fn convert_stream(&self, stream: &mut dyn ReadSeek, hints: &StreamInfo) -> Result<ConversionResult> {
        self.convert_with_base(stream, hints.clone())
    }

    /// Convert a non-seekable reader by buffering it in memory first.
    pub fn convert_reader(&self, mut reader: impl Read, hints: &StreamInfo) -> Result<ConversionResult> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        self.convert_bytes(&buffer, hints)
    }

    /// Convert an in-memory buffer.
    pub fn convert_bytes(&self, bytes: &[u8], hints: &StreamInfo) -> Result<ConversionResult> {
        self.convert_stream(&mut Cursor::new(bytes), hints)
    }

    /// Convert a `file:`, `data:`, `http:` or `https:` URI.
    ///
    /// # Errors
    ///
    /// - `Validation` for other schemes, `file:` URIs naming a remote host,
    ///   and malformed `data:` URIs
    /// - `MissingDependency` for `http(s):` when built without the `http` feature
    #[tracing::instrument(skip(self, hints))]
    pub fn convert_uri(&self, uri: &str, hints: &StreamInfo) -> Result<ConversionResult> {
        let scheme = uri.split_once(':').map(|(scheme, _)| scheme.to_ascii_lowercase());

        match scheme.as_deref() {
            Some("file") => {
                let (host, path) = file_uri_to_path(uri)?;
                if let Some(host) = host.filter(|host| host != "localhost") {
                    return Err(DocdownError::validation(format!(
                        "Unsupported file URI: {}. Netloc '{}' is not a local host.",
                        uri, host
                    )));
                }
                self.convert_path(path, hints)
            }
            Some("data") => {
                let data_uri = parse_data_uri(uri)?;
                let mut base = StreamInfo::new();
                base.mimetype = data_uri.mimetype.clone();
                base.charset = data_uri.attribute("charset").map(str::to_string);
                self.convert_with_base(&mut Cursor::new(data_uri.data), base.merge([hints]))
            }
            Some("http" | "https") => self.convert_http(uri, hints),
            _ => Err(DocdownError::validation(format!(
                "Unsupported URI scheme: {}. Supported schemes are: file:, data:, http:, https:",
                uri
            ))),
        }
    }

    #[cfg(feature = "http")]
    fn convert_http(&self, uri: &str, hints: &StreamInfo) -> Result<ConversionResult> {
        let response = crate::core::http::fetch(uri)?;
        self.convert_response(&response, hints)
    }

    #[cfg(not(feature = "http"))]
    fn convert_http(&self, uri: &str, _hints: &StreamInfo) -> Result<ConversionResult> {
        Err(DocdownError::MissingDependency(format!(
            "Fetching {} requires docdown to be built with the 'http' feature",
            uri
        )))
    }

    /// Convert an already-fetched HTTP response.
    ///
    /// The base guess is derived from `Content-Type`, `Content-Disposition`
    /// and the response URL.
    pub fn convert_response(&self, response: &FetchedResponse, hints: &StreamInfo) -> Result<ConversionResult> {
        let base = stream_info_from_response(
            &response.url,
            response.content_type.as_deref(),
            response.content_disposition.as_deref(),
        );
        self.convert_with_base(&mut Cursor::new(response.body.as_slice()), base.merge([hints]))
    }

    fn convert_with_base(&self, stream: &mut dyn ReadSeek, base: StreamInfo) -> Result<ConversionResult> {
        let guesses = extract_guesses(stream, &base, &self.config().detection)?;
        self.dispatch(stream, &guesses, self.config())
    }
}
