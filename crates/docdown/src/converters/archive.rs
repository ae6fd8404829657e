//! ZIP archives: every member is converted through the engine it was registered on.
//!
//! Output layout:
//!
//! ```text
//! Content from the zip file `reports.zip`:
//!
//! ## File: q1/summary.txt
//!
//! <converted member>
//! ```
//!
//! Members no converter accepts, or that every converter fails on, are skipped.
//! Archives nested deeper than `archives.max_depth` are refused, so they end
//! up skipped by the archive that contains them.

use crate::core::config::ConversionConfig;
use crate::core::dispatch::EngineHandle;
use crate::core::io::ReadSeek;
use crate::core::uri::extension_of;
use crate::plugins::{Acceptance, DocumentConverter, PRIORITY_GENERIC_FILE_FORMAT, Plugin};
use crate::types::{ConversionResult, StreamInfo};
use crate::{DocdownError, Result};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const ACCEPTED_EXTENSIONS: &[&str] = &[".zip"];
const ACCEPTED_MIME_PREFIXES: &[&str] = &["application/zip"];

/// Holds a weak handle back to the engine, so members can be dispatched
/// without the registry owning itself.
pub struct ZipConverter {
    engine: EngineHandle,
}

impl ZipConverter {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }
}

impl Plugin for ZipConverter {
    fn name(&self) -> &str {
        "zip-converter"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn description(&self) -> &str {
        "Converts every file inside a ZIP archive"
    }
}

impl DocumentConverter for ZipConverter {
    fn accepts(&self, _stream: &mut dyn ReadSeek, info: &StreamInfo, _config: &ConversionConfig) -> Acceptance {
        (info.extension_in(ACCEPTED_EXTENSIONS) || info.mimetype_starts_with(ACCEPTED_MIME_PREFIXES)).into()
    }

    fn convert(
        &self,
        stream: &mut dyn ReadSeek,
        info: &StreamInfo,
        config: &ConversionConfig,
    ) -> Result<ConversionResult> {
        let source = info
            .url
            .as_deref()
            .or(info.local_path.as_deref())
            .or(info.filename.as_deref())
            .unwrap_or_default();
        if config.archive_depth >= config.archives.max_depth {
            return Err(DocdownError::validation(format!(
                "Archive `{}` is nested deeper than {} levels",
                source, config.archives.max_depth
            )));
        }
        let nested = ConversionConfig {
            archive_depth: config.archive_depth + 1,
            ..config.clone()
        };

        let mut markdown = format!("Content from the zip file `{}`:\n\n", source);

        let mut archive =
            ZipArchive::new(stream).map_err(|e| DocdownError::parsing(format!("Failed to read ZIP archive: {}", e)))?;

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| DocdownError::parsing(format!("Failed to read ZIP entry: {}", e)))?;

            if file.is_dir() {
                continue;
            }

            let name = file.name().to_string();
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            drop(file);

            let basename = name.rsplit('/').next().unwrap_or(&name).to_string();
            let mut hints = StreamInfo::new().with_filename(basename.as_str());
            hints.extension = extension_of(&basename);

            match self.engine.convert_stream(&mut Cursor::new(contents), &hints, &nested) {
                Ok(result) => {
                    markdown.push_str(&format!("## File: {}\n\n", name));
                    markdown.push_str(&result.markdown);
                    markdown.push_str("\n\n");
                }
                Err(error) if error.is_unsupported_format() || error.is_conversion_failure() => {
                    tracing::debug!(member = %name, %error, "Skipping archive member");
                }
                Err(error) => return Err(error),
            }
        }

        Ok(ConversionResult::new(markdown.trim()))
    }

    fn priority(&self) -> f64 {
        PRIORITY_GENERIC_FILE_FORMAT
    }

    fn supported_extensions(&self) -> &[&str] {
        ACCEPTED_EXTENSIONS
    }
}
