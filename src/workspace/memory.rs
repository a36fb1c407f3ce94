//! In-memory workspace filesystem for testing.
//!
//! Keeps directory children in insertion order so tests can assert on
//! enumeration order, and can be told to fail on specific paths to
//! simulate unreadable directories or files.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{Result, TributaryError};
use crate::workspace::{DirEntry, WorkspaceFs};

#[derive(Debug, Clone)]
enum Node {
    Dir(Vec<OsString>),
    File(String),
}

/// In-memory filesystem.
///
/// Thread-safe implementation using `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct MemoryFs {
    nodes: RwLock<HashMap<PathBuf, Node>>,
    failures: RwLock<HashSet<PathBuf>>,
}

impl MemoryFs {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory and any missing ancestors.
    pub fn add_dir(&self, path: impl AsRef<Path>) -> &Self {
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        ensure_dir(&mut nodes, path.as_ref());
        self
    }

    /// Create a file with the given content, creating parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) -> &Self {
        let path = path.as_ref();
        let mut nodes = self.nodes.write().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = path.parent() {
            ensure_dir(&mut nodes, parent);
            link_child(&mut nodes, parent, path);
        }
        nodes.insert(path.to_path_buf(), Node::File(content.into()));
        self
    }

    /// Make every read of `path` fail with a permission error.
    pub fn fail_on(&self, path: impl AsRef<Path>) -> &Self {
        self.failures
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.as_ref().to_path_buf());
        self
    }

    fn check_failure(&self, path: &Path) -> Result<()> {
        let failures = self.failures.read().unwrap_or_else(|e| e.into_inner());
        if failures.contains(path) {
            return Err(TributaryError::io(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "injected failure"),
            ));
        }
        Ok(())
    }

    fn node(&self, path: &Path) -> Option<Node> {
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        nodes.get(path).cloned()
    }
}

fn ensure_dir(nodes: &mut HashMap<PathBuf, Node>, path: &Path) {
    if nodes.contains_key(path) {
        return;
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(nodes, parent);
            link_child(nodes, parent, path);
        }
    }
    nodes.insert(path.to_path_buf(), Node::Dir(Vec::new()));
}

fn link_child(nodes: &mut HashMap<PathBuf, Node>, parent: &Path, child: &Path) {
    let Some(name) = child.file_name() else {
        return;
    };
    let name = name.to_os_string();
    if let Some(Node::Dir(children)) = nodes.get_mut(parent) {
        if !children.contains(&name) {
            children.push(name);
        }
    }
}

fn not_found(path: &Path) -> TributaryError {
    TributaryError::io(
        path,
        io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
    )
}

impl WorkspaceFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.node(path), Some(Node::Dir(_)))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        self.check_failure(path)?;
        let nodes = self.nodes.read().unwrap_or_else(|e| e.into_inner());
        match nodes.get(path) {
            Some(Node::Dir(children)) => Ok(children
                .iter()
                .map(|name| {
                    let is_dir = matches!(nodes.get(&path.join(name)), Some(Node::Dir(_)));
                    DirEntry::from_os(name.clone(), is_dir)
                })
                .collect()),
            Some(Node::File(_)) => Err(TributaryError::io(
                path,
                io::Error::other("not a directory"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.check_failure(path)?;
        match self.node(path) {
            Some(Node::File(content)) => Ok(content),
            Some(Node::Dir(_)) => Err(TributaryError::io(
                path,
                io::Error::other("is a directory"),
            )),
            None => Err(not_found(path)),
        }
    }
}
