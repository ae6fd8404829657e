//! Conversion orchestration.
//!
//! # Architecture
//!
//! - **Entry points** (`convert`): derive a base guess from a path, URI or response
//! - **Type signals** (`guess`, `mime`): content sniffing, extension tables, charset detection
//! - **Dispatch** (`dispatch`): priority-ordered converter selection with failure collection
//! - **Configuration** (`config`): options loaded from TOML, YAML or JSON
//! - **I/O** (`io`, `uri`, `http`): seekable streams, `file:`/`data:` URIs, HTTP fetch
//!
//! # Example
//!
//! ```rust
//! use docdown::core::config::ConversionConfig;
//! use docdown::core::dispatch::DispatchEngine;
//! use docdown::StreamInfo;
//!
//! # fn example() -> docdown::Result<()> {
//! let engine = DispatchEngine::with_builtins()?.with_config(ConversionConfig::default());
//! let result = engine.convert_bytes(b"name,age\nAda,36\n", &StreamInfo::new().with_extension(".csv"))?;
//! assert!(result.markdown.starts_with("| name | age |"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod convert;
pub mod dispatch;
pub mod guess;
#[cfg(feature = "http")]
pub mod http;
pub mod io;
pub mod mime;
pub mod uri;

pub use config::{ArchiveConfig, ConversionConfig, DetectionConfig};
pub use dispatch::{DispatchEngine, EngineHandle};
