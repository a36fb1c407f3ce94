//! Utility functions for Tributary.
//!
//! This module provides common utilities used across Tributary modules.

use std::fs;
use std::path::Path;

use crate::error::{Result, TributaryError};

/// Default maximum size of a project file read into memory (10 MB).
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Read a file as text with size limit protection.
///
/// Invalid UTF-8 is replaced rather than rejected, so a stray binary file
/// never aborts indexing.
///
/// # Errors
///
/// Returns an error if:
/// * The file cannot be read (doesn't exist, permission denied, etc.)
/// * The file exceeds `max_size`
pub fn read_lossy_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| TributaryError::io(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(TributaryError::index(format!(
            "File {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    let bytes = fs::read(path).map_err(|e| TributaryError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Format a path relative to `base` with `/` separators.
///
/// Falls back to the full path when `path` is not under `base`.
pub fn slash_relative(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
