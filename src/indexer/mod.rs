//! dbt indexer for Tributary.
//!
//! Finds the dbt project of every repository under `repos/`, parses its
//! models and schema YAML files, and writes `manifest.md` and `sources.md`
//! to `dbt-index/<repo>/`. The presence of `manifest.md` is what repository
//! discovery reports as "indexed".
//!
//! Indexing is best-effort per file and per project: a broken file is
//! logged and skipped, a broken project is logged and recorded in the
//! report while the others are still indexed.

pub mod markdown;
pub mod model;
pub mod project;
pub mod sql;
pub mod yaml;

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::IndexerConfig;
use crate::discovery::{locate_project, ProjectLocation};
use crate::error::{FailOpen, Result, TributaryError};
use crate::util::{read_lossy_with_limit, slash_relative};
use crate::workspace::layout::{INDEX_MANIFEST, INDEX_SOURCES};
use crate::workspace::{DirEntry, DiskFs, WorkspaceFs, WorkspaceLayout};

pub use markdown::{generate_manifest_md, generate_sources_md, render_manifest};
pub use model::{ModelInfo, SourceInfo};
pub use project::{read_project_config, resolve_default_materialization, ProjectConfig};
pub use sql::{parse_sql_config, parse_sql_dependencies};
pub use yaml::{parse_yaml_descriptions, parse_yaml_sources, strip_jinja};

const MODELS_DIR: &str = "models";
const YAML_EXTENSIONS: &[&str] = &["yml", "yaml"];

/// A dbt project found inside a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbtProject {
    /// Repository directory name, for display.
    pub repo_name: String,
    /// Repository directory name as stored on disk.
    pub dir_name: OsString,
    /// Where the project sits inside the repository.
    pub location: ProjectLocation,
    /// Absolute project directory.
    pub path: PathBuf,
}

/// A project that was indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedProject {
    /// Repository directory name.
    pub repo_name: String,
    /// dbt project name (falls back to the repository name).
    pub project_name: String,
    /// Workspace-relative project directory.
    pub project_path: String,
    /// Number of models written.
    pub models: usize,
    /// Number of sources written.
    pub sources: usize,
}

/// A project that could not be indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedProject {
    /// Repository directory name.
    pub repo_name: String,
    /// What went wrong.
    pub error: String,
}

/// Summary of an indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    /// Successfully indexed projects.
    pub indexed: Vec<IndexedProject>,
    /// Projects that failed.
    pub failed: Vec<FailedProject>,
}

impl IndexReport {
    /// Whether no project was found at all.
    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty() && self.failed.is_empty()
    }
}

/// Find dbt projects under a `repos/` directory, sorted by directory name.
///
/// Uses the same listing and project lookup as repository discovery.
pub fn find_dbt_projects<F: WorkspaceFs + ?Sized>(
    fs: &F,
    repos_dir: &Path,
) -> Result<Vec<DbtProject>> {
    let mut entries: Vec<DirEntry> = fs
        .list_dir(repos_dir)?
        .into_iter()
        .filter(|entry| entry.is_dir)
        .collect();
    entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(entries
        .into_iter()
        .filter_map(|entry| {
            let repo_dir = repos_dir.join(&entry.file_name);
            let location = locate_project(fs, &repo_dir)?;
            let path = match location.subdir() {
                Some(subdir) => repo_dir.join(subdir),
                None => repo_dir,
            };
            Some(DbtProject {
                repo_name: entry.name,
                dir_name: entry.file_name,
                location,
                path,
            })
        })
        .collect())
}

/// Files under `models_dir` with the given extension, skipping vendored
/// and build directories. Sorted by path.
fn model_files(models_dir: &Path, extension: &str, settings: &IndexerConfig) -> Vec<PathBuf> {
    WalkDir::new(models_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && settings
                        .skip_dirs
                        .iter()
                        .any(|skip| entry.file_name().to_string_lossy() == skip.as_str()))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable path under models/");
                None
            }
        })
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .collect()
}

fn parse_model(
    sql_path: &Path,
    project_dir: &Path,
    models_dir: &Path,
    descriptions: &BTreeMap<String, String>,
    defaults: &BTreeMap<String, String>,
    settings: &IndexerConfig,
) -> Result<ModelInfo> {
    let content = read_lossy_with_limit(sql_path, settings.max_file_bytes)?;
    let name = sql_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| TributaryError::index(format!("no file name: {}", sql_path.display())))?;

    let (refs, sources) = parse_sql_dependencies(&content);
    let materialized = parse_sql_config(&content)
        .remove("materialized")
        .or_else(|| resolve_default_materialization(sql_path, models_dir, defaults));

    Ok(ModelInfo {
        description: descriptions.get(&name).cloned(),
        path: slash_relative(sql_path, project_dir),
        name,
        materialized,
        refs,
        sources,
    })
}

/// Index the models and sources of one dbt project.
///
/// A project without `models/` yields empty results. Files that cannot be
/// read or parsed are logged and skipped. Models are sorted by name.
pub fn index_dbt_project(
    project_dir: &Path,
    defaults: &BTreeMap<String, String>,
    settings: &IndexerConfig,
) -> (Vec<ModelInfo>, Vec<SourceInfo>) {
    let models_dir = project_dir.join(MODELS_DIR);
    if !models_dir.is_dir() {
        return (Vec::new(), Vec::new());
    }

    let mut descriptions = BTreeMap::new();
    let mut sources = Vec::new();

    for extension in YAML_EXTENSIONS {
        for yaml_path in model_files(&models_dir, extension, settings) {
            // Read errors carry the path; invalid YAML already yields nothing.
            descriptions.extend(
                parse_yaml_descriptions(&yaml_path, settings.max_file_bytes)
                    .fail_open_default("parse_yaml_descriptions"),
            );
            sources.extend(
                parse_yaml_sources(&yaml_path, settings.max_file_bytes)
                    .fail_open_default("parse_yaml_sources"),
            );
        }
    }

    let mut models = Vec::new();
    for sql_path in model_files(&models_dir, "sql", settings) {
        match parse_model(
            &sql_path,
            project_dir,
            &models_dir,
            &descriptions,
            defaults,
            settings,
        ) {
            Ok(model) => models.push(model),
            Err(err) => tracing::warn!(
                path = %sql_path.display(),
                error = %err,
                "failed to parse model"
            ),
        }
    }

    models.sort_by(|a, b| a.name.cmp(&b.name));
    (models, sources)
}

fn index_single_project(
    project: &DbtProject,
    layout: &WorkspaceLayout,
    settings: &IndexerConfig,
) -> Result<IndexedProject> {
    let config = read_project_config(&project.path, settings.max_file_bytes)?;
    let project_name = config
        .name
        .clone()
        .unwrap_or_else(|| project.repo_name.clone());

    let (models, sources) =
        index_dbt_project(&project.path, &config.default_materializations, settings);

    let out_dir = layout.index_dir(&project.dir_name);
    fs::create_dir_all(&out_dir).map_err(|e| TributaryError::io(&out_dir, e))?;

    let project_path = project.location.project_path(&project.repo_name);

    let manifest_path = out_dir.join(INDEX_MANIFEST);
    let manifest = generate_manifest_md(&models, &project.repo_name, &project_path, &project_name);
    fs::write(&manifest_path, manifest).map_err(|e| TributaryError::io(&manifest_path, e))?;

    let sources_path = out_dir.join(INDEX_SOURCES);
    let sources_md = generate_sources_md(&sources, &project.repo_name);
    fs::write(&sources_path, sources_md).map_err(|e| TributaryError::io(&sources_path, e))?;

    tracing::info!(
        repo = %project.repo_name,
        models = models.len(),
        sources = sources.len(),
        "indexed dbt project"
    );

    Ok(IndexedProject {
        repo_name: project.repo_name.clone(),
        project_name,
        project_path,
        models: models.len(),
        sources: sources.len(),
    })
}

/// Index every dbt project of a workspace into `dbt-index/`.
///
/// Without `repos/` or without any dbt project nothing is written and the
/// report is empty. A failing project does not stop the others.
pub fn index_all_projects(root: &Path, settings: &IndexerConfig) -> Result<IndexReport> {
    let layout = WorkspaceLayout::new(root);
    let repos_dir = layout.repos_dir();
    if !repos_dir.is_dir() {
        return Ok(IndexReport::default());
    }

    let projects = find_dbt_projects(&DiskFs::new(), &repos_dir)?;
    if projects.is_empty() {
        return Ok(IndexReport::default());
    }

    let index_root = layout.dbt_index_dir();
    fs::create_dir_all(&index_root).map_err(|e| TributaryError::io(&index_root, e))?;

    let mut report = IndexReport::default();
    for project in &projects {
        match index_single_project(project, &layout, settings) {
            Ok(indexed) => report.indexed.push(indexed),
            Err(err) => {
                tracing::warn!(repo = %project.repo_name, error = %err, "failed to index project");
                report.failed.push(FailedProject {
                    repo_name: project.repo_name.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}
