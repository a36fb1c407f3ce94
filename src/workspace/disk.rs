//! Disk-backed workspace filesystem.

use std::fs;
use std::path::Path;

use crate::error::{Result, TributaryError};
use crate::workspace::{DirEntry, WorkspaceFs};

/// Reads the real filesystem through `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFs;

impl DiskFs {
    /// Create a disk filesystem handle.
    pub fn new() -> Self {
        Self
    }
}

impl WorkspaceFs for DiskFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).map_err(|e| TributaryError::io(path, e))?;

        let mut listing = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TributaryError::io(path, e))?;
            listing.push(DirEntry::from_os(entry.file_name(), entry.path().is_dir()));
        }

        Ok(listing)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|e| TributaryError::io(path, e))
    }
}
