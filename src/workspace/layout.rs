//! Directory layout of a workspace root.
//!
//! ```text
//! <root>/RULES.md
//! <root>/repos/<name>/dbt_project.yml
//! <root>/repos/<name>/dbt/dbt_project.yml
//! <root>/dbt-index/<name>/manifest.md
//! <root>/dbt-index/<name>/sources.md
//! <root>/databases/type=<T>/database=<D>/
//! ```

use std::path::{Path, PathBuf};

/// Free-text rules document at the workspace root.
pub const RULES_FILE: &str = "RULES.md";
/// Folder holding one subdirectory per repository.
pub const REPOS_DIR: &str = "repos";
/// Folder holding one index directory per repository.
pub const DBT_INDEX_DIR: &str = "dbt-index";
/// Folder holding `type=<T>/database=<D>` connection declarations.
pub const DATABASES_DIR: &str = "databases";
/// dbt project manifest file name.
pub const PROJECT_MANIFEST: &str = "dbt_project.yml";
/// Subdirectory name for a nested dbt project.
pub const NESTED_PROJECT_DIR: &str = "dbt";
/// Index marker and model listing.
pub const INDEX_MANIFEST: &str = "manifest.md";
/// Source listing written next to the index manifest.
pub const INDEX_SOURCES: &str = "sources.md";
/// Directory-name prefix for connection types.
pub const TYPE_PREFIX: &str = "type=";
/// Directory-name prefix for databases.
pub const DATABASE_PREFIX: &str = "database=";

/// Paths inside a workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    /// Create a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/RULES.md`
    pub fn rules_path(&self) -> PathBuf {
        self.root.join(RULES_FILE)
    }

    /// `<root>/repos`
    pub fn repos_dir(&self) -> PathBuf {
        self.root.join(REPOS_DIR)
    }

    /// `<root>/repos/<name>`
    pub fn repo_dir(&self, name: impl AsRef<Path>) -> PathBuf {
        self.repos_dir().join(name)
    }

    /// `<root>/dbt-index`
    pub fn dbt_index_dir(&self) -> PathBuf {
        self.root.join(DBT_INDEX_DIR)
    }

    /// `<root>/dbt-index/<name>`
    pub fn index_dir(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dbt_index_dir().join(name)
    }

    /// `<root>/dbt-index/<name>/manifest.md`
    pub fn index_manifest_path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.index_dir(name).join(INDEX_MANIFEST)
    }

    /// `<root>/databases`
    pub fn databases_dir(&self) -> PathBuf {
        self.root.join(DATABASES_DIR)
    }
}

/// Format a workspace-relative path with `/` separators.
pub fn relative_display(parts: &[&str]) -> String {
    parts.join("/")
}
