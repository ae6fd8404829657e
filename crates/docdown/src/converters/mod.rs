//! Built-in converters.
//!
//! All converters implement the [`DocumentConverter`](crate::plugins::DocumentConverter)
//! plugin trait and are registered through [`register_builtin_converters`].

use crate::Result;
use crate::core::dispatch::DispatchEngine;
use std::sync::Arc;

pub mod csv;
pub mod ipynb;
pub mod text;

#[cfg(feature = "archives")]
pub mod archive;

#[cfg(feature = "html")]
pub mod html;

#[cfg(feature = "xml")]
pub mod rss;

pub use csv::CsvConverter;
pub use ipynb::IpynbConverter;
pub use text::PlainTextConverter;

#[cfg(feature = "archives")]
pub use archive::ZipConverter;

#[cfg(feature = "html")]
pub use html::HtmlConverter;

#[cfg(feature = "xml")]
pub use rss::RssConverter;

/// Register the built-in converters on `engine`.
///
/// Registration order matters within a priority band: later registrations are
/// tried first, so the catch-all plain text converter goes in first.
///
/// # Example
///
/// ```rust
/// use docdown::DispatchEngine;
/// use docdown::converters::register_builtin_converters;
///
/// # fn main() -> docdown::Result<()> {
/// let engine = DispatchEngine::new();
/// register_builtin_converters(&engine)?;
/// assert!(engine.registry().list().contains(&"csv-converter".to_string()));
/// # Ok(())
/// # }
/// ```
pub fn register_builtin_converters(engine: &DispatchEngine) -> Result<()> {
    engine.register_converter(Arc::new(PlainTextConverter::new()))?;

    #[cfg(feature = "archives")]
    engine.register_converter(Arc::new(ZipConverter::new(engine.handle())))?;

    #[cfg(feature = "html")]
    engine.register_converter(Arc::new(HtmlConverter::new()))?;

    #[cfg(feature = "xml")]
    engine.register_converter(Arc::new(RssConverter::new()))?;

    engine.register_converter(Arc::new(IpynbConverter::new()))?;
    engine.register_converter(Arc::new(CsvConverter::new()))?;

    Ok(())
}
