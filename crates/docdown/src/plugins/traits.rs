//! Base plugin trait definition.
//!
//! Every converter is a `Plugin`: it has a stable name used in diagnostics and
//! registry lookups, a version, and initialize/shutdown hooks called by the
//! registry.

use crate::Result;

/// Base trait that all plugins must implement.
///
/// # Thread Safety
///
/// Plugins are shared as `Arc<dyn ...>` across threads and must be `Send + Sync`.
/// Lifecycle methods take `&self`; plugins holding mutable state use interior
/// mutability.
///
/// # Example
///
/// ```rust
/// use docdown::plugins::Plugin;
/// use docdown::Result;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// struct LoggingPlugin {
///     ready: AtomicBool,
/// }
///
/// impl Plugin for LoggingPlugin {
///     fn name(&self) -> &str {
///         "logging-plugin"
///     }
///
///     fn version(&self) -> String {
///         "1.0.0".to_string()
///     }
///
///     fn initialize(&self) -> Result<()> {
///         self.ready.store(true, Ordering::Release);
///         Ok(())
///     }
///
///     fn shutdown(&self) -> Result<()> {
///         self.ready.store(false, Ordering::Release);
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    /// Unique, kebab-case identifier (e.g. `"csv-converter"`).
    ///
    /// Shown in `FailedAttempt` diagnostics and used by `ConverterRegistry::remove`.
    /// Must be non-empty and contain no whitespace.
    fn name(&self) -> &str;

    /// Semantic version of this plugin.
    fn version(&self) -> String;

    /// Called once when the plugin is registered.
    ///
    /// # Errors
    ///
    /// The plugin is not registered if this returns an error.
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Called when the plugin is removed from its registry.
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        ""
    }

    fn author(&self) -> &str {
        ""
    }
}
