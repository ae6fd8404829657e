//! Error types for docdown.
//!
//! All fallible operations return [`DocdownError`]. Two variants form the
//! caller-visible outcome of a dispatch run:
//!
//! - `UnsupportedFormat` - no converter accepted the stream under any guess
//! - `FileConversionFailed` - at least one converter accepted, and every one of them failed
//!
//! Everything a converter returns from `convert` is captured by the dispatch
//! engine as a [`FailedAttempt`] and only surfaces through `FileConversionFailed`.
//!
//! **System errors bubble up unchanged:** `DocdownError::Io` is produced from
//! `std::io::Error` with `?` and never wrapped, so permission and missing-file
//! problems keep their original kind.
//!
//! # Example
//!
//! ```rust
//! use docdown::{DocdownError, Result};
//!
//! fn read_hint(path: &str) -> Result<String> {
//!     let content = std::fs::read_to_string(path)?;
//!
//!     if content.trim().is_empty() {
//!         return Err(DocdownError::validation(format!("Hint file is empty: {}", path)));
//!     }
//!
//!     Ok(content)
//! }
//! ```
use std::fmt;
use thiserror::Error;

/// Result type alias using `DocdownError`.
pub type Result<T> = std::result::Result<T, DocdownError>;

/// Message carried by `UnsupportedFormat` when dispatch finds no taker.
pub const NO_CONVERTER_ACCEPTED: &str = "Could not convert stream to Markdown. No converter attempted a conversion, \
     suggesting that the filetype is simply not supported.";

/// Main error type for all docdown operations.
#[derive(Debug, Error)]
pub enum DocdownError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("File conversion failed after {} attempts:\n{}", .attempts.len(), render_attempts(.attempts))]
    FileConversionFailed { attempts: Vec<FailedAttempt> },

    #[error("{0}")]
    Other(String),
}

/// A converter that accepted a stream but failed to convert it.
#[derive(Debug)]
pub struct FailedAttempt {
    /// Plugin name of the converter.
    pub converter: String,
    pub error: DocdownError,
}

impl FailedAttempt {
    pub fn new(converter: impl Into<String>, error: DocdownError) -> Self {
        Self {
            converter: converter.into(),
            error,
        }
    }
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " - {} threw {}", self.converter, self.error)
    }
}

fn render_attempts(attempts: &[FailedAttempt]) -> String {
    attempts.iter().map(|attempt| format!("{}\n", attempt)).collect()
}

impl From<serde_json::Error> for DocdownError {
    fn from(err: serde_json::Error) -> Self {
        DocdownError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocdownError {
    error_constructor!(parsing, Parsing);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    pub fn plugin<M: Into<String>, N: Into<String>>(plugin_name: N, message: M) -> Self {
        Self::Plugin {
            message: message.into(),
            plugin_name: plugin_name.into(),
        }
    }

    /// True when nothing accepted the stream.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_))
    }

    /// True when something accepted the stream but every attempt failed.
    pub fn is_conversion_failure(&self) -> bool {
        matches!(self, Self::FileConversionFailed { .. })
    }

    /// Failed attempts in the order they happened, empty for other variants.
    pub fn attempts(&self) -> &[FailedAttempt] {
        match self {
            Self::FileConversionFailed { attempts } => attempts,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DocdownError = io_err.into();
        assert!(matches!(err, DocdownError::Io(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_parsing_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad data");
        let err = DocdownError::parsing_with_source("invalid format", source);
        assert_eq!(err.to_string(), "Parsing error: invalid format");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_error() {
        let err = DocdownError::validation("invalid input");
        assert_eq!(err.to_string(), "Validation error: invalid input");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_plugin_error() {
        let err = DocdownError::plugin("zip-converter", "engine dropped");
        assert_eq!(err.to_string(), "Plugin error in 'zip-converter': engine dropped");
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = DocdownError::UnsupportedFormat(NO_CONVERTER_ACCEPTED.to_string());
        assert!(err.is_unsupported_format());
        assert!(!err.is_conversion_failure());
        assert!(err.attempts().is_empty());
        assert!(err.to_string().starts_with("Unsupported format: Could not convert stream"));
    }

    #[test]
    fn test_file_conversion_failed_lists_attempts() {
        let err = DocdownError::FileConversionFailed {
            attempts: vec![
                FailedAttempt::new("csv-converter", DocdownError::parsing("ragged row")),
                FailedAttempt::new("plain-text-converter", DocdownError::Other("boom".to_string())),
            ],
        };

        assert!(err.is_conversion_failure());
        assert_eq!(err.attempts().len(), 2);
        assert_eq!(
            err.to_string(),
            "File conversion failed after 2 attempts:\n \
             - csv-converter threw Parsing error: ragged row\n \
             - plain-text-converter threw boom\n"
        );
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DocdownError = json_err.into();
        assert!(matches!(err, DocdownError::Serialization { .. }));
    }

    #[test]
    fn test_io_error_bubbles_unchanged() {
        fn read_file() -> Result<String> {
            let content = std::fs::read_to_string("/nonexistent/docdown/file.txt")?;
            Ok(content)
        }

        assert!(matches!(read_file().unwrap_err(), DocdownError::Io(_)));
    }
}
