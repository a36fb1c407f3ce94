//! Repository detection for Tributary.
//!
//! Each immediate subdirectory of `repos/` is one repository. A repository
//! is a dbt project when it has a `dbt_project.yml` at its root or inside a
//! `dbt/` subdirectory (root wins). A project counts as indexed when
//! `dbt-index/<name>/manifest.md` exists; that file is never read here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discovery::{not_a_directory, ScanOutcome};
use crate::error::Result;
use crate::workspace::layout::{relative_display, NESTED_PROJECT_DIR, PROJECT_MANIFEST, REPOS_DIR};
use crate::workspace::{DiskFs, WorkspaceFs, WorkspaceLayout};

/// One subdirectory of `repos/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Directory base name.
    pub name: String,
    /// Whether a dbt project manifest was found.
    pub has_project: bool,
    /// Workspace-relative directory containing the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_path: Option<String>,
    /// Whether the project has an index. Absent for non-projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
}

impl Repository {
    /// A repository without a dbt project.
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_project: false,
            project_path: None,
            indexed: None,
        }
    }

    /// A repository holding a dbt project.
    pub fn project(name: impl Into<String>, project_path: impl Into<String>, indexed: bool) -> Self {
        Self {
            name: name.into(),
            has_project: true,
            project_path: Some(project_path.into()),
            indexed: Some(indexed),
        }
    }
}

/// Where a repository keeps its dbt project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectLocation {
    /// `repos/<name>/dbt_project.yml`
    Root,
    /// `repos/<name>/dbt/dbt_project.yml`
    Nested,
}

impl ProjectLocation {
    /// Directory holding the manifest, relative to the repository directory.
    pub fn subdir(&self) -> Option<&'static str> {
        match self {
            Self::Root => None,
            Self::Nested => Some(NESTED_PROJECT_DIR),
        }
    }

    /// Workspace-relative project directory for repository `name`.
    pub fn project_path(&self, name: &str) -> String {
        match self.subdir() {
            Some(subdir) => relative_display(&[REPOS_DIR, name, subdir]),
            None => relative_display(&[REPOS_DIR, name]),
        }
    }
}

/// Find the dbt project inside a repository directory.
///
/// The root layout takes priority over the nested one.
pub fn locate_project<F: WorkspaceFs + ?Sized>(fs: &F, repo_dir: &Path) -> Option<ProjectLocation> {
    if fs.is_file(&repo_dir.join(PROJECT_MANIFEST)) {
        Some(ProjectLocation::Root)
    } else if fs.is_file(&repo_dir.join(NESTED_PROJECT_DIR).join(PROJECT_MANIFEST)) {
        Some(ProjectLocation::Nested)
    } else {
        None
    }
}

/// Scan `repos/` through the given filesystem.
pub fn scan_repositories_with<F: WorkspaceFs + ?Sized>(
    fs: &F,
    root: Option<&Path>,
) -> ScanOutcome<Repository> {
    let Some(root) = root else {
        return ScanOutcome::NotConfigured;
    };

    let layout = WorkspaceLayout::new(root);
    let repos_dir = layout.repos_dir();
    if !fs.exists(&repos_dir) {
        return ScanOutcome::Missing(repos_dir);
    }
    if !fs.is_dir(&repos_dir) {
        return ScanOutcome::Failed(not_a_directory(&repos_dir));
    }

    ScanOutcome::from_result(collect_repositories(fs, &layout))
}

fn collect_repositories<F: WorkspaceFs + ?Sized>(
    fs: &F,
    layout: &WorkspaceLayout,
) -> Result<Vec<Repository>> {
    let mut repositories = Vec::new();

    for entry in fs.list_dir(&layout.repos_dir())? {
        if !entry.is_dir {
            continue;
        }

        let repo_dir = layout.repo_dir(&entry.file_name);
        let repository = match locate_project(fs, &repo_dir) {
            Some(location) => {
                // Index location is keyed by the repository name, whatever the layout.
                let indexed = fs.is_file(&layout.index_manifest_path(&entry.file_name));
                Repository::project(&entry.name, location.project_path(&entry.name), indexed)
            }
            None => Repository::plain(&entry.name),
        };
        repositories.push(repository);
    }

    tracing::debug!(count = repositories.len(), "scanned repositories");
    Ok(repositories)
}

/// Scan `repos/` on disk.
///
/// Returns `None` when no root is configured, `repos/` is missing or empty,
/// or the scan fails; otherwise every repository in enumeration order.
pub fn scan_repositories(root: Option<&Path>) -> Option<Vec<Repository>> {
    scan_repositories_with(&DiskFs::new(), root).into_option("scan_repositories")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::MemoryFs;
    use std::fs;
    use tempfile::TempDir;

    fn find<'a>(repos: &'a [Repository], name: &str) -> &'a Repository {
        repos.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn test_no_root_returns_none() {
        assert_eq!(scan_repositories(None), None);
        assert!(matches!(
            scan_repositories_with(&MemoryFs::new(), None),
            ScanOutcome::NotConfigured
        ));
    }

    #[test]
    fn test_missing_repos_dir_returns_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(scan_repositories(Some(temp.path())), None);
        assert!(matches!(
            scan_repositories_with(&DiskFs::new(), Some(temp.path())),
            ScanOutcome::Missing(_)
        ));
    }

    #[test]
    fn test_empty_repos_dir_returns_none() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("repos")).unwrap();

        assert_eq!(scan_repositories(Some(temp.path())), None);
    }

    #[test]
    fn test_only_files_returns_none() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("repos")).unwrap();
        fs::write(temp.path().join("repos/README.md"), "hello").unwrap();

        assert_eq!(scan_repositories(Some(temp.path())), None);
    }

    #[test]
    fn test_root_layout_project() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repos/foo");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("dbt_project.yml"), "name: foo").unwrap();

        let repos = scan_repositories(Some(temp.path())).unwrap();
        assert_eq!(repos, vec![Repository::project("foo", "repos/foo", false)]);
    }

    #[test]
    fn test_nested_layout_project() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("repos/bar/dbt");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("dbt_project.yml"), "name: bar").unwrap();

        let repos = scan_repositories(Some(temp.path())).unwrap();
        let bar = find(&repos, "bar");
        assert!(bar.has_project);
        assert_eq!(bar.project_path.as_deref(), Some("repos/bar/dbt"));
    }

    #[test]
    fn test_root_layout_takes_priority() {
        let fs = MemoryFs::new();
        fs.add_file("/ws/repos/both/dbt_project.yml", "name: root")
            .add_file("/ws/repos/both/dbt/dbt_project.yml", "name: nested");

        let repos = scan_repositories_with(&fs, Some(Path::new("/ws")))
            .into_option("test")
            .unwrap();
        assert_eq!(repos[0].project_path.as_deref(), Some("repos/both"));
    }

    #[test]
    fn test_indexed_flag() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("repos/foo")).unwrap();
        fs::write(root.join("repos/foo/dbt_project.yml"), "name: foo").unwrap();
        fs::create_dir_all(root.join("repos/bar/dbt")).unwrap();
        fs::write(root.join("repos/bar/dbt/dbt_project.yml"), "name: bar").unwrap();
        fs::create_dir_all(root.join("repos/docs")).unwrap();
        fs::create_dir_all(root.join("dbt-index/foo")).unwrap();
        fs::write(root.join("dbt-index/foo/manifest.md"), "# index").unwrap();

        let repos = scan_repositories(Some(root)).unwrap();
        assert_eq!(repos.len(), 3);
        assert_eq!(find(&repos, "foo").indexed, Some(true));
        assert_eq!(find(&repos, "bar").indexed, Some(false));
        assert_eq!(find(&repos, "docs").indexed, None);
        assert!(!find(&repos, "docs").has_project);
        assert_eq!(find(&repos, "docs").project_path, None);
    }

    #[test]
    fn test_nested_project_index_keyed_by_repo_name() {
        let fs = MemoryFs::new();
        fs.add_file("/ws/repos/bar/dbt/dbt_project.yml", "name: bar")
            .add_file("/ws/dbt-index/bar/manifest.md", "# index");

        let repos = scan_repositories_with(&fs, Some(Path::new("/ws")))
            .into_option("test")
            .unwrap();
        assert_eq!(repos, vec![Repository::project("bar", "repos/bar/dbt", true)]);
    }

    #[test]
    fn test_enumeration_order_is_preserved() {
        let fs = MemoryFs::new();
        fs.add_dir("/ws/repos/zulu")
            .add_file("/ws/repos/notes.txt", "skip me")
            .add_file("/ws/repos/alpha/dbt_project.yml", "name: alpha")
            .add_dir("/ws/repos/mike");

        let repos = scan_repositories_with(&fs, Some(Path::new("/ws")))
            .into_option("test")
            .unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_manifest_directory_is_not_a_project() {
        let fs = MemoryFs::new();
        fs.add_dir("/ws/repos/odd/dbt_project.yml");

        let repos = scan_repositories_with(&fs, Some(Path::new("/ws")))
            .into_option("test")
            .unwrap();
        assert_eq!(repos, vec![Repository::plain("odd")]);
    }

    #[test]
    fn test_listing_failure_returns_none() {
        let fs = MemoryFs::new();
        fs.add_dir("/ws/repos/foo").fail_on("/ws/repos");

        let outcome = scan_repositories_with(&fs, Some(Path::new("/ws")));
        assert!(outcome.is_failed());
        assert_eq!(outcome.into_option("scan_repositories"), None);
    }

    #[test]
    fn test_repos_is_a_file_returns_none() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("repos"), "not a dir").unwrap();

        assert_eq!(scan_repositories(Some(temp.path())), None);
        let outcome = scan_repositories_with(&DiskFs::new(), Some(temp.path()));
        assert!(matches!(
            outcome,
            ScanOutcome::Failed(crate::error::TributaryError::Discovery { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_repository_name() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"caf\xe9");
        let repo = temp.path().join("repos").join(raw);
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("dbt_project.yml"), "name: cafe").unwrap();
        let index = temp.path().join("dbt-index").join(raw);
        fs::create_dir_all(&index).unwrap();
        fs::write(index.join("manifest.md"), "# index").unwrap();

        let repos = scan_repositories(Some(temp.path())).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name, "caf\u{fffd}");
        assert!(repos[0].has_project);
        assert_eq!(repos[0].indexed, Some(true));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let plain = serde_json::to_value(Repository::plain("docs")).unwrap();
        assert_eq!(plain, serde_json::json!({"name": "docs", "hasProject": false}));

        let project = serde_json::to_value(Repository::project("foo", "repos/foo", false)).unwrap();
        assert_eq!(
            project,
            serde_json::json!({
                "name": "foo",
                "hasProject": true,
                "projectPath": "repos/foo",
                "indexed": false
            })
        );
    }
}
