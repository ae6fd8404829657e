//! Conversion options.
//!
//! [`ConversionConfig`] is the options bundle handed, untouched, to every
//! `accepts` and `convert` call. It can be built programmatically or loaded
//! from TOML, YAML or JSON, and [`ConversionConfig::discover`] looks for a
//! `docdown.toml` in the current directory and its parents.

use crate::{DocdownError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Options for a conversion call.
///
/// # Example
///
/// ```rust
/// use docdown::ConversionConfig;
///
/// let config = ConversionConfig {
///     keep_data_uris: true,
///     ..Default::default()
/// };
/// assert_eq!(config.detection.charset_bytes, 4096);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Keep `data:` URIs of embedded images instead of truncating them.
    pub keep_data_uris: bool,

    /// Style map forwarded to converters that understand one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_map: Option<String>,

    /// Free-form per-converter settings (tool paths, endpoints, ...).
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub converter_options: HashMap<String, String>,

    /// Limits for type detection.
    pub detection: DetectionConfig,

    /// Limits for container formats.
    pub archives: ArchiveConfig,

    /// How many archives the current call is nested in. Maintained by the
    /// archive converter; never read from config files.
    #[serde(skip)]
    pub archive_depth: usize,
}

impl ConversionConfig {
    /// Look up a converter-specific option.
    pub fn converter_option(&self, key: &str) -> Option<&str> {
        self.converter_options.get(key).map(String::as_str)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| DocdownError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| DocdownError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        serde_json::from_str(&content)
            .map_err(|e| DocdownError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension (TOML by default).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml" | "yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Discover `docdown.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let current = std::env::current_dir().map_err(DocdownError::Io)?;
        Self::discover_from(&current)
    }

    /// Like [`ConversionConfig::discover`], starting at `start`.
    pub fn discover_from(start: &Path) -> Result<Option<Self>> {
        for dir in start.ancestors() {
            let candidate = dir.join("docdown.toml");
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "Using discovered config");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }
        }
        Ok(None)
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocdownError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}

/// Bounds on how much of a stream type detection may look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Prefix length handed to content classifiers.
    pub sniff_bytes: usize,
    /// Prefix length used for charset detection.
    pub charset_bytes: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            sniff_bytes: 64 * 1024,
            charset_bytes: 4096,
        }
    }
}

/// Limits for archive converters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Archives nested deeper than this are not opened.
    pub max_depth: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { max_depth: 8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ConversionConfig::default();
        assert!(!config.keep_data_uris);
        assert!(config.style_map.is_none());
        assert_eq!(config.detection.sniff_bytes, 65536);
        assert_eq!(config.archives.max_depth, 8);
        assert_eq!(config.archive_depth, 0);
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docdown.toml");

        fs::write(
            &config_path,
            r#"
keep_data_uris = true

[converter_options]
exiftool_path = "/usr/bin/exiftool"

[detection]
charset_bytes = 1024
        "#,
        )
        .unwrap();

        let config = ConversionConfig::from_toml_file(&config_path).unwrap();
        assert!(config.keep_data_uris);
        assert_eq!(config.converter_option("exiftool_path"), Some("/usr/bin/exiftool"));
        assert_eq!(config.detection.charset_bytes, 1024);
        assert_eq!(config.detection.sniff_bytes, 65536);
    }

    #[test]
    fn test_from_yaml_and_json_files() {
        let dir = tempdir().unwrap();
        let yaml_path = dir.path().join("docdown.yaml");
        let json_path = dir.path().join("docdown.json");
        fs::write(&yaml_path, "style_map: \"p[style-name='Title'] => h1\"\n").unwrap();
        fs::write(&json_path, r#"{"keep_data_uris": true}"#).unwrap();

        let yaml = ConversionConfig::from_file(&yaml_path).unwrap();
        assert_eq!(yaml.style_map.as_deref(), Some("p[style-name='Title'] => h1"));

        let json = ConversionConfig::from_file(&json_path).unwrap();
        assert!(json.keep_data_uris);
    }

    #[test]
    fn test_invalid_toml_is_validation_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("docdown.toml");
        fs::write(&config_path, "keep_data_uris = [").unwrap();

        let err = ConversionConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, DocdownError::Validation { .. }));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_missing_file_is_validation_error() {
        let err = ConversionConfig::from_toml_file("/nonexistent/docdown.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_discover_from_parent_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("docdown.toml"), "keep_data_uris = true\n").unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let config = ConversionConfig::discover_from(&nested).unwrap();
        assert!(config.is_some_and(|c| c.keep_data_uris));
    }

    #[test]
    fn test_discover_none() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("empty");
        fs::create_dir_all(&nested).unwrap();

        // A docdown.toml above the temp dir would be picked up; only check it parses.
        assert!(ConversionConfig::discover_from(&nested).is_ok());
    }
}
