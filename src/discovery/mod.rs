//! Discovery module for Tributary.
//!
//! This module answers three read-only questions about a workspace root:
//! - Rules: the optional `RULES.md` document
//! - Repositories: which `repos/` entries hold a dbt project, and whether
//!   each project has been indexed into `dbt-index/`
//! - Connections: which `databases/type=<T>/database=<D>` pairs exist
//!
//! Every scan first produces a [`ScanOutcome`], which keeps the difference
//! between "not configured", "missing", "empty" and "failed". The public
//! functions collapse that into `Option`: `None` for all of those, and a
//! non-empty list otherwise. Failures are logged, never returned.

pub mod connections;
pub mod repositories;
pub mod rules;

use std::path::{Path, PathBuf};

use crate::error::{FailOpen, Result, TributaryError};

pub use connections::{parse_key_value, scan_connections, scan_connections_with, Connection};
pub use repositories::{
    locate_project, scan_repositories, scan_repositories_with, ProjectLocation, Repository,
};
pub use rules::{load_rules, read_rules};

/// Result of a single discovery scan before it is collapsed to `Option`.
#[derive(Debug)]
pub enum ScanOutcome<T> {
    /// No project root is configured.
    NotConfigured,
    /// The directory to scan does not exist.
    Missing(PathBuf),
    /// The scan ran and found nothing.
    Empty,
    /// The scan found at least one item.
    Found(Vec<T>),
    /// The scan failed part-way; no partial results are kept.
    Failed(TributaryError),
}

impl<T> ScanOutcome<T> {
    /// Build an outcome from a finished scan, mapping an empty list to `Empty`.
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Found(items)
        }
    }

    /// Build an outcome from a fallible scan.
    pub fn from_result(result: Result<Vec<T>>) -> Self {
        match result {
            Ok(items) => Self::from_items(items),
            Err(err) => Self::Failed(err),
        }
    }

    /// Short machine-readable label for the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Missing(_) => "missing",
            Self::Empty => "empty",
            Self::Found(_) => "found",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether the scan failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Collapse into the public contract: a non-empty list or `None`.
    ///
    /// A failed scan is logged under `operation` before it turns into `None`.
    pub fn into_option(self, operation: &str) -> Option<Vec<T>> {
        let result: Result<Option<Vec<T>>> = match self {
            Self::Found(items) => Ok(Some(items)),
            Self::Failed(err) => Err(err),
            Self::NotConfigured | Self::Missing(_) | Self::Empty => Ok(None),
        };
        result.fail_open_with(operation, None)
    }
}

/// Error for a scan target that exists but is not a directory.
pub(crate) fn not_a_directory(path: &Path) -> TributaryError {
    TributaryError::discovery(format!("{} is not a directory", path.display()))
}
