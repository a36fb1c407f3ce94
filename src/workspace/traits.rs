//! Filesystem traits for workspace discovery.
//!
//! Discovery only ever reads. Every query a scanner makes goes through
//! `WorkspaceFs`, so scanners can run against a real directory or an
//! in-memory tree.

use std::ffi::OsString;
use std::path::Path;

use crate::error::Result;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Base name for display, lossily converted to UTF-8.
    pub name: String,
    /// Base name exactly as the filesystem returned it. Join paths with this.
    pub file_name: OsString,
    /// Whether the entry is a directory (symlinks are followed).
    pub is_dir: bool,
}

impl DirEntry {
    /// Create a new directory entry from a UTF-8 name.
    pub fn new(name: impl Into<String>, is_dir: bool) -> Self {
        let name = name.into();
        Self {
            file_name: OsString::from(&name),
            name,
            is_dir,
        }
    }

    /// Create a directory entry from a raw filesystem name.
    pub fn from_os(file_name: OsString, is_dir: bool) -> Self {
        Self {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            is_dir,
        }
    }
}

/// Read-only view of a filesystem.
pub trait WorkspaceFs: Send + Sync {
    /// Check whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Check whether `path` is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Check whether `path` exists and is not a directory.
    fn is_file(&self, path: &Path) -> bool {
        self.exists(path) && !self.is_dir(path)
    }

    /// List the immediate entries of a directory.
    ///
    /// Entries come back in enumeration order, which is not sorted.
    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String>;
}
