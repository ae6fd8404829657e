//! docdown - convert documents to Markdown
//!
//! docdown takes arbitrary binary input (a local file, a seekable stream, a
//! `file:`/`data:`/`http(s):` URI or a fetched HTTP response), works out what
//! it probably is, and hands it to the best registered converter.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docdown::{DispatchEngine, StreamInfo};
//!
//! # fn main() -> docdown::Result<()> {
//! let engine = DispatchEngine::with_builtins()?;
//! let result = engine.convert("report.csv", &StreamInfo::new())?;
//! println!("{}", result.markdown);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Type signals** (`core::guess`): ordered [`StreamInfo`] guesses from content, file name and caller hints
//! - **Converters** (`plugins`, `converters`): the [`plugins::DocumentConverter`] contract and built-in formats
//! - **Registry** (`plugins::registry`): converters ordered by priority, most recent first on ties
//! - **Dispatch** (`core::dispatch`): first accepting converter that succeeds wins
//! - **Normalization** (`text`): trailing whitespace and blank-line clean-up of every result
//!
//! # Features
//!
//! - `html` (default): HTML and XHTML through `html-to-markdown-rs`
//! - `xml` (default): RSS and Atom feeds
//! - `archives` (default): ZIP archives, converting each member
//! - `http`: fetching `http:` and `https:` URIs
//! - `api`: REST server (`axum`) exposing conversion over HTTP, implies `http`

#![deny(unsafe_code)]

#[cfg(feature = "api")]
pub mod api;
pub mod converters;
pub mod core;
pub mod error;
pub mod plugins;
pub mod text;
pub mod types;

pub use error::{DocdownError, FailedAttempt, NO_CONVERTER_ACCEPTED, Result};
pub use types::*;

pub use core::config::{ArchiveConfig, ConversionConfig, DetectionConfig};
pub use core::dispatch::{DispatchEngine, EngineHandle, PositionInvariantViolated};
pub use core::uri::{DataUri, FetchedResponse, parse_data_uri};

pub use core::mime::{
    ATOM_MIME_TYPE, CSV_MIME_TYPE, HTML_MIME_TYPE, IPYNB_MIME_TYPE, JSON_MIME_TYPE, MARKDOWN_MIME_TYPE,
    PLAIN_TEXT_MIME_TYPE, RSS_MIME_TYPE, XML_MIME_TYPE, ZIP_MIME_TYPE,
};
