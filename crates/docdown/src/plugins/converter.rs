//! Converter plugin contract.

use crate::Result;
use crate::core::config::ConversionConfig;
use crate::core::io::ReadSeek;
use crate::plugins::Plugin;
use crate::types::{ConversionResult, StreamInfo};

/// Priority band for single-purpose converters (CSV, notebooks, feeds, ...).
pub const PRIORITY_SPECIFIC_FILE_FORMAT: f64 = 0.0;

/// Priority band for catch-all converters (plain text, HTML, archives).
pub const PRIORITY_GENERIC_FILE_FORMAT: f64 = 10.0;

/// Outcome of a capability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Accept,
    Decline,
    /// The converter does not implement capability checks. Dispatch skips it.
    NotApplicable,
}

impl Acceptance {
    pub fn is_accept(self) -> bool {
        self == Acceptance::Accept
    }
}

impl From<bool> for Acceptance {
    fn from(accepted: bool) -> Self {
        if accepted { Acceptance::Accept } else { Acceptance::Decline }
    }
}

/// Trait for format converters.
///
/// Both methods receive the same stream, guess and options so that a positive
/// `accepts` is a promise that `convert` is expected to work.
///
/// # Stream position
///
/// `accepts` must leave the stream exactly where it found it, on every path.
/// Use [`crate::core::io::peek`] for bounded look-ahead; it seeks back before
/// returning. The dispatch engine asserts this and treats a moved stream as a
/// bug in the converter. `convert` may read freely; the engine rewinds after it.
///
/// # Example
///
/// ```rust
/// use docdown::plugins::{Acceptance, DocumentConverter, Plugin};
/// use docdown::core::io::{ReadSeek, read_to_string_lossy};
/// use docdown::{ConversionConfig, ConversionResult, Result, StreamInfo};
///
/// struct ShoutConverter;
///
/// impl Plugin for ShoutConverter {
///     fn name(&self) -> &str { "shout-converter" }
///     fn version(&self) -> String { "1.0.0".to_string() }
/// }
///
/// impl DocumentConverter for ShoutConverter {
///     fn accepts(&self, _: &mut dyn ReadSeek, info: &StreamInfo, _: &ConversionConfig) -> Acceptance {
///         info.extension_in(&[".shout"]).into()
///     }
///
///     fn convert(&self, stream: &mut dyn ReadSeek, _: &StreamInfo, _: &ConversionConfig) -> Result<ConversionResult> {
///         Ok(ConversionResult::new(read_to_string_lossy(stream)?.to_uppercase()))
///     }
/// }
/// ```
pub trait DocumentConverter: Plugin {
    /// Cheap capability check from metadata or a bounded peek.
    ///
    /// Converters that cannot tell in advance keep the default, which makes
    /// dispatch skip them.
    fn accepts(&self, stream: &mut dyn ReadSeek, info: &StreamInfo, config: &ConversionConfig) -> Acceptance {
        let _ = (stream, info, config);
        Acceptance::NotApplicable
    }

    /// Convert the stream to Markdown.
    ///
    /// May assume `accepts` would return `Accept`, but must not assume it was
    /// called. Errors are recorded by the engine and dispatch moves on.
    fn convert(&self, stream: &mut dyn ReadSeek, info: &StreamInfo, config: &ConversionConfig)
    -> Result<ConversionResult>;

    /// Priority used by `DispatchEngine::register_converter`. Lower runs earlier.
    fn priority(&self) -> f64 {
        PRIORITY_SPECIFIC_FILE_FORMAT
    }

    /// File extensions (with the leading dot) this converter takes on name alone.
    ///
    /// Informational only; dispatch always goes through `accepts`.
    fn supported_extensions(&self) -> &[&str] {
        &[]
    }
}
