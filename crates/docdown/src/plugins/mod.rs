//! Plugin system for converters.
//!
//! - [`Plugin`] - base lifecycle and identity trait
//! - [`DocumentConverter`] - the accept/convert contract every format handler implements
//! - [`ConverterRegistry`] - ordered `(converter, priority)` registrations
//!
//! Converters are stored as `Arc<dyn DocumentConverter>` and registered on a
//! [`crate::DispatchEngine`], which owns its registry:
//!
//! ```rust
//! use docdown::plugins::{Acceptance, DocumentConverter, Plugin};
//! use docdown::core::io::ReadSeek;
//! use docdown::{ConversionConfig, ConversionResult, DispatchEngine, Result, StreamInfo};
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! struct EchoConverter;
//!
//! impl Plugin for EchoConverter {
//!     fn name(&self) -> &str { "echo-converter" }
//!     fn version(&self) -> String { "1.0.0".to_string() }
//! }
//!
//! impl DocumentConverter for EchoConverter {
//!     fn accepts(&self, _: &mut dyn ReadSeek, info: &StreamInfo, _: &ConversionConfig) -> Acceptance {
//!         info.extension_in(&[".echo"]).into()
//!     }
//!
//!     fn convert(&self, _: &mut dyn ReadSeek, _: &StreamInfo, _: &ConversionConfig) -> Result<ConversionResult> {
//!         Ok(ConversionResult::new("echo"))
//!     }
//! }
//!
//! let engine = DispatchEngine::new();
//! engine.register(Arc::new(EchoConverter), 0.0)?;
//!
//! let hints = StreamInfo::new().with_extension(".echo");
//! let result = engine.convert_stream(&mut Cursor::new(b"ping".to_vec()), &hints)?;
//! assert_eq!(result.markdown, "echo");
//! # Ok::<(), docdown::DocdownError>(())
//! ```

pub mod converter;
pub mod registry;
pub mod traits;

pub use converter::{Acceptance, DocumentConverter, PRIORITY_GENERIC_FILE_FORMAT, PRIORITY_SPECIFIC_FILE_FORMAT};
pub use registry::{ConverterRegistration, ConverterRegistry};
pub use traits::Plugin;
