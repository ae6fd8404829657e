//! The dispatch loop.
//!
//! For each guess (plus a final empty guess), each registered converter is
//! tried in priority order. The first converter that accepts and converts
//! successfully wins, and its output is normalized. Failures are collected as
//! [`FailedAttempt`]s.
//!
//! The stream is rewound to its entry position after every `convert` call,
//! successful or not, and the position is asserted around every `accepts`
//! call. A converter that moves the stream in `accepts` is a bug and panics
//! the dispatch.

use crate::core::config::ConversionConfig;
use crate::core::io::ReadSeek;
use crate::error::{FailedAttempt, NO_CONVERTER_ACCEPTED};
use crate::plugins::{ConverterRegistry, DocumentConverter};
use crate::text::normalize_markdown;
use crate::types::{ConversionResult, StreamInfo};
use crate::{DocdownError, Result};
use std::any::Any;
use std::fmt;
use std::io::{Seek, SeekFrom};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

/// Converter registry plus default options.
///
/// Cloning is cheap and shares the registry, which makes
/// `engine.clone().with_config(..)` the way to use different options for a
/// single call.
///
/// # Example
///
/// ```rust
/// use docdown::{DispatchEngine, StreamInfo};
///
/// let engine = DispatchEngine::with_builtins()?;
/// let result = engine.convert_bytes(b"Hello, World!\n\n\n\nDone.", &StreamInfo::new())?;
/// assert_eq!(result.markdown, "Hello, World!\n\nDone.");
/// # Ok::<(), docdown::DocdownError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DispatchEngine {
    registry: Arc<ConverterRegistry>,
    config: ConversionConfig,
}

impl DispatchEngine {
    /// Engine with an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the built-in converters registered.
    pub fn with_builtins() -> Result<Self> {
        let engine = Self::new();
        crate::converters::register_builtin_converters(&engine)?;
        Ok(engine)
    }

    /// Engine over an existing registry.
    pub fn with_registry(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            registry,
            config: ConversionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ConversionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    /// Register a converter at an explicit priority.
    pub fn register(&self, converter: Arc<dyn DocumentConverter>, priority: f64) -> Result<()> {
        self.registry.register(converter, priority)
    }

    /// Register a converter at its own [`DocumentConverter::priority`].
    pub fn register_converter(&self, converter: Arc<dyn DocumentConverter>) -> Result<()> {
        let priority = converter.priority();
        self.registry.register(converter, priority)
    }

    /// Handle for converters that need to re-enter dispatch (archives).
    pub fn handle(&self) -> EngineHandle {
        EngineHandle {
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Try every guess against every converter; first success wins.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` if no converter accepted any guess
    /// - `FileConversionFailed` if some accepted but all of them failed
    /// - `Io` if the stream position cannot be read or restored
    ///
    /// # Panics
    ///
    /// With a [`PositionInvariantViolated`] payload if a converter's `accepts`
    /// leaves the stream at a different offset. That payload is re-raised
    /// rather than recorded when it comes out of a nested `convert`.
    #[tracing::instrument(skip_all, fields(guesses = guesses.len()))]
    pub fn dispatch(
        &self,
        stream: &mut dyn ReadSeek,
        guesses: &[StreamInfo],
        config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let restore_point = stream.stream_position()?;
        let converters = self.registry.snapshot_sorted();
        let fallback = StreamInfo::default();
        let mut attempts = Vec::new();

        for (index, info) in guesses.iter().chain(std::iter::once(&fallback)).enumerate() {
            for registration in &converters {
                let converter = registration.converter();
                let name = converter.name();

                check_position(stream, restore_point, name, "before")?;
                let acceptance = converter.accepts(stream, info, config);
                check_position(stream, restore_point, name, "after")?;

                tracing::trace!(guess = index, converter = name, ?acceptance, "Capability check");
                if !acceptance.is_accept() {
                    continue;
                }

                tracing::debug!(guess = index, converter = name, "Attempting conversion");
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| converter.convert(stream, info, config)));
                stream.seek(SeekFrom::Start(restore_point))?;

                match outcome {
                    Ok(Ok(result)) => {
                        tracing::debug!(converter = name, "Conversion succeeded");
                        return Ok(ConversionResult {
                            markdown: normalize_markdown(&result.markdown),
                            title: result.title,
                        });
                    }
                    Ok(Err(error)) => {
                        tracing::warn!(converter = name, %error, "Converter accepted the stream but failed");
                        attempts.push(FailedAttempt::new(name, error));
                    }
                    Err(panic) if panic.is::<PositionInvariantViolated>() => panic::resume_unwind(panic),
                    Err(panic) => {
                        let reason = panic_reason(&panic);
                        tracing::warn!(converter = name, %reason, "Converter panicked");
                        attempts.push(FailedAttempt::new(
                            name,
                            DocdownError::Other(format!("converter panicked: {}", reason)),
                        ));
                    }
                }
            }
        }

        if attempts.is_empty() {
            Err(DocdownError::UnsupportedFormat(NO_CONVERTER_ACCEPTED.to_string()))
        } else {
            Err(DocdownError::FileConversionFailed { attempts })
        }
    }
}

/// Panic payload for a converter that moved the stream in `accepts`.
///
/// Never turned into a [`FailedAttempt`], at any nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionInvariantViolated {
    pub converter: String,
    /// `"before"` or `"after"` the `accepts` call.
    pub stage: &'static str,
    pub expected: u64,
    pub actual: u64,
}

impl fmt::Display for PositionInvariantViolated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stream offset changed {} accepts() of converter '{}': expected {}, found {}",
            self.stage, self.converter, self.expected, self.actual
        )
    }
}

fn check_position(stream: &mut dyn ReadSeek, expected: u64, converter: &str, stage: &'static str) -> Result<()> {
    let actual = stream.stream_position()?;
    if actual != expected {
        let violation = PositionInvariantViolated {
            converter: converter.to_string(),
            stage,
            expected,
            actual,
        };
        tracing::error!(%violation, "Converter broke the stream position contract");
        panic::panic_any(violation);
    }
    Ok(())
}

fn panic_reason(panic: &Box<dyn Any + Send + 'static>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Non-owning handle to a [`DispatchEngine`]'s registry.
///
/// Converters stored in the registry hold this instead of the engine, so the
/// registry does not keep itself alive.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    registry: Weak<ConverterRegistry>,
}

impl EngineHandle {
    /// Run a nested conversion with fresh guesses and its own stream bookkeeping.
    ///
    /// # Errors
    ///
    /// `Plugin` if the engine's registry has been dropped, otherwise whatever
    /// [`DispatchEngine::convert_stream`] returns.
    pub fn convert_stream(
        &self,
        stream: &mut dyn ReadSeek,
        hints: &StreamInfo,
        config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| DocdownError::plugin("dispatch-engine", "Engine was dropped before a nested conversion"))?;

        DispatchEngine::with_registry(registry)
            .with_config(config.clone())
            .convert_stream(stream, hints)
    }
}
