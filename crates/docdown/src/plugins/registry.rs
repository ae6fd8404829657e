//! Converter registration and ordering.
//!
//! The registry is an ordered list of `(converter, priority)` pairs. New
//! registrations go to the front, and [`ConverterRegistry::snapshot_sorted`]
//! returns a stable sort of a copy of that list, so that among equal
//! priorities the most recently registered converter is tried first.

use crate::plugins::DocumentConverter;
use crate::{DocdownError, Result};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Validate a plugin name before registration.
///
/// # Rules
///
/// - Name cannot be empty
/// - Name cannot contain whitespace
///
/// # Errors
///
/// Returns `Validation` if the name is invalid.
fn validate_plugin_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DocdownError::validation("Plugin name cannot be empty"));
    }

    if name.contains(char::is_whitespace) {
        return Err(DocdownError::validation(format!(
            "Plugin name '{}' cannot contain whitespace",
            name
        )));
    }

    Ok(())
}

/// A converter paired with the priority it was registered at.
#[derive(Clone)]
pub struct ConverterRegistration {
    converter: Arc<dyn DocumentConverter>,
    priority: f64,
}

impl ConverterRegistration {
    pub fn converter(&self) -> &Arc<dyn DocumentConverter> {
        &self.converter
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn name(&self) -> &str {
        self.converter.name()
    }
}

impl fmt::Debug for ConverterRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistration")
            .field("converter", &self.converter.name())
            .field("priority", &self.priority)
            .finish()
    }
}

/// Registry of converters, shared between an engine and its handles.
///
/// # Thread Safety
///
/// Registration takes a write lock for a single insert. Readers copy the list
/// under a read lock and sort the copy, so a registration racing with an
/// in-flight dispatch never disturbs that dispatch's order.
///
/// # Example
///
/// ```rust
/// use docdown::plugins::{ConverterRegistry, PRIORITY_GENERIC_FILE_FORMAT};
/// use docdown::converters::PlainTextConverter;
/// use std::sync::Arc;
///
/// let registry = ConverterRegistry::new();
/// registry.register(Arc::new(PlainTextConverter), PRIORITY_GENERIC_FILE_FORMAT)?;
/// assert_eq!(registry.list(), vec!["plain-text-converter".to_string()]);
/// # Ok::<(), docdown::DocdownError>(())
/// ```
#[derive(Default)]
pub struct ConverterRegistry {
    registrations: RwLock<Vec<ConverterRegistration>>,
}

impl ConverterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from an explicit list, registered in iteration order.
    pub fn with_registrations<I>(registrations: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Arc<dyn DocumentConverter>, f64)>,
    {
        let registry = Self::new();
        for (converter, priority) in registrations {
            registry.register(converter, priority)?;
        }
        Ok(registry)
    }

    /// Register a converter at `priority` (lower is tried earlier).
    ///
    /// The converter is initialized and inserted at the front of the list.
    ///
    /// # Errors
    ///
    /// - `Validation` for an invalid name or a NaN priority
    /// - whatever `initialize` returns
    pub fn register(&self, converter: Arc<dyn DocumentConverter>, priority: f64) -> Result<()> {
        validate_plugin_name(converter.name())?;

        if priority.is_nan() {
            return Err(DocdownError::validation(format!(
                "Priority for converter '{}' must be a number",
                converter.name()
            )));
        }

        converter.initialize()?;

        tracing::debug!(converter = converter.name(), priority, "registered converter");
        self.registrations
            .write()
            .insert(0, ConverterRegistration { converter, priority });

        Ok(())
    }

    /// Stable sort of a copy of the registrations by ascending priority.
    pub fn snapshot_sorted(&self) -> Vec<ConverterRegistration> {
        let mut snapshot = self.registrations.read().clone();
        snapshot.sort_by(|a, b| a.priority.partial_cmp(&b.priority).unwrap_or(Ordering::Equal));
        snapshot
    }

    /// Names in live (most recent first) order.
    pub fn list(&self) -> Vec<String> {
        self.registrations
            .read()
            .iter()
            .map(|registration| registration.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }

    /// Remove every registration of `name` and shut the converter down.
    pub fn remove(&self, name: &str) -> Result<()> {
        let removed: Vec<ConverterRegistration> = {
            let mut registrations = self.registrations.write();
            let (removed, kept): (Vec<_>, Vec<_>) = registrations
                .drain(..)
                .partition(|registration| registration.name() == name);
            *registrations = kept;
            removed
        };

        if let Some(registration) = removed.first() {
            registration.converter.shutdown()?;
        }

        Ok(())
    }

    /// Shutdown all converters and clear the registry.
    pub fn shutdown_all(&self) -> Result<()> {
        let drained: Vec<ConverterRegistration> = self.registrations.write().drain(..).collect();
        for registration in drained {
            registration.converter.shutdown()?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("registrations", &*self.registrations.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConversionConfig;
    use crate::core::io::ReadSeek;
    use crate::plugins::Plugin;
    use crate::types::{ConversionResult, StreamInfo};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    struct MockConverter {
        name: String,
        shutdowns: Arc<AtomicUsize>,
        fail_init: bool,
    }

    impl MockConverter {
        fn named(name: &str) -> Arc<dyn DocumentConverter> {
            Arc::new(Self {
                name: name.to_string(),
                shutdowns: Arc::new(AtomicUsize::new(0)),
                fail_init: false,
            })
        }
    }

    impl Plugin for MockConverter {
        fn name(&self) -> &str {
            &self.name
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            if self.fail_init {
                return Err(DocdownError::plugin(&self.name, "init failed"));
            }
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            self.shutdowns.fetch_add(1, AtomicOrdering::SeqCst);
            Ok(())
        }
    }

    impl DocumentConverter for MockConverter {
        fn convert(&self, _: &mut dyn ReadSeek, _: &StreamInfo, _: &ConversionConfig) -> Result<ConversionResult> {
            Ok(ConversionResult::new(self.name.clone()))
        }
    }

    fn names(snapshot: &[ConverterRegistration]) -> Vec<&str> {
        snapshot.iter().map(|registration| registration.name()).collect()
    }

    #[test]
    fn test_register_inserts_at_front() {
        let registry = ConverterRegistry::new();
        registry.register(MockConverter::named("first"), 0.0).unwrap();
        registry.register(MockConverter::named("second"), 0.0).unwrap();

        assert_eq!(registry.list(), vec!["second", "first"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_snapshot_is_stable_sort_with_most_recent_first() {
        let registry = ConverterRegistry::new();
        registry.register(MockConverter::named("a"), 10.0).unwrap();
        registry.register(MockConverter::named("b"), 0.0).unwrap();
        registry.register(MockConverter::named("c"), 0.0).unwrap();

        assert_eq!(names(&registry.snapshot_sorted()), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_interleaved_priorities() {
        let registry = ConverterRegistry::with_registrations([
            (MockConverter::named("generic"), 10.0),
            (MockConverter::named("specific"), 0.0),
            (MockConverter::named("between"), 5.0),
            (MockConverter::named("last"), 11.0),
            (MockConverter::named("first"), -1.0),
        ])
        .unwrap();

        assert_eq!(
            names(&registry.snapshot_sorted()),
            vec!["first", "specific", "between", "generic", "last"]
        );
    }

    #[test]
    fn test_snapshot_unaffected_by_later_registration() {
        let registry = ConverterRegistry::new();
        registry.register(MockConverter::named("a"), 0.0).unwrap();

        let snapshot = registry.snapshot_sorted();
        registry.register(MockConverter::named("b"), 0.0).unwrap();

        assert_eq!(names(&snapshot), vec!["a"]);
        assert_eq!(names(&registry.snapshot_sorted()), vec!["b", "a"]);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let registry = ConverterRegistry::new();
        assert!(matches!(
            registry.register(MockConverter::named(""), 0.0),
            Err(DocdownError::Validation { .. })
        ));
        assert!(matches!(
            registry.register(MockConverter::named("has space"), 0.0),
            Err(DocdownError::Validation { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_nan_priority_rejected() {
        let registry = ConverterRegistry::new();
        let result = registry.register(MockConverter::named("nan"), f64::NAN);
        assert!(matches!(result, Err(DocdownError::Validation { .. })));
    }

    #[test]
    fn test_failed_initialize_prevents_registration() {
        let registry = ConverterRegistry::new();
        let converter = Arc::new(MockConverter {
            name: "broken".to_string(),
            shutdowns: Arc::new(AtomicUsize::new(0)),
            fail_init: true,
        });

        assert!(registry.register(converter, 0.0).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_and_shutdown_all() {
        let shutdowns = Arc::new(AtomicUsize::new(0));
        let registry = ConverterRegistry::new();
        for name in ["x", "y", "z"] {
            let converter = Arc::new(MockConverter {
                name: name.to_string(),
                shutdowns: Arc::clone(&shutdowns),
                fail_init: false,
            });
            registry.register(converter, 0.0).unwrap();
        }

        registry.remove("y").unwrap();
        assert_eq!(registry.list(), vec!["z", "x"]);
        assert_eq!(shutdowns.load(AtomicOrdering::SeqCst), 1);

        registry.remove("missing").unwrap();
        registry.shutdown_all().unwrap();
        assert!(registry.is_empty());
        assert_eq!(shutdowns.load(AtomicOrdering::SeqCst), 3);
    }
}
