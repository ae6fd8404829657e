//! Stream and file I/O utilities.
//!
//! Every stream handed to the guesser and to converters is a seekable byte
//! source behind `&mut dyn ReadSeek`. Look-ahead always goes through [`peek`],
//! which restores the read position before returning.

use crate::text::safe_decode;
use crate::{DocdownError, Result};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Object-safe combination of [`Read`] and [`Seek`].
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Read up to `limit` bytes from the current position, then seek back.
///
/// The position is restored even when the read fails.
///
/// # Errors
///
/// Returns the read error, or the seek error if restoring the position fails.
pub fn peek(stream: &mut dyn ReadSeek, limit: usize) -> io::Result<Vec<u8>> {
    let start = stream.stream_position()?;
    let mut buf = Vec::with_capacity(limit.min(64 * 1024));
    let read = (&mut *stream).take(limit as u64).read_to_end(&mut buf);
    stream.seek(SeekFrom::Start(start))?;
    read?;
    Ok(buf)
}

/// Read everything from the current position to the end.
///
/// # Errors
///
/// Returns `DocdownError::Io` for I/O errors (these always bubble up).
pub fn read_to_end(stream: &mut dyn ReadSeek) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read the rest of the stream as text, detecting the encoding.
pub fn read_to_string_lossy(stream: &mut dyn ReadSeek) -> Result<String> {
    let bytes = read_to_end(stream)?;
    Ok(safe_decode(&bytes, None))
}

/// Validate that a file exists.
///
/// # Errors
///
/// Returns `DocdownError::Validation` if the file doesn't exist.
pub fn validate_file_exists(path: impl AsRef<Path>) -> Result<()> {
    if !path.as_ref().exists() {
        return Err(DocdownError::validation(format!(
            "File does not exist: {}",
            path.as_ref().display()
        )));
    }
    Ok(())
}
