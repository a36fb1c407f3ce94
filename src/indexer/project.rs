//! `dbt_project.yml` reading.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::error::Result;
use crate::indexer::yaml::{parse_mapping, scalar_to_string};
use crate::util::read_lossy_with_limit;
use crate::workspace::layout::PROJECT_MANIFEST;

static PROJECT_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"(?m)^name:\s*['"]?([^'"#\n]+)"##).expect("valid project name regex")
});

/// Key for the project-wide default materialization.
pub const ROOT_DEFAULT_KEY: &str = "_root_";

/// The parts of `dbt_project.yml` the indexer uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Project `name`.
    pub name: Option<String>,
    /// Directory name to default materialization.
    pub default_materializations: BTreeMap<String, String>,
}

/// Read `dbt_project.yml` from a project directory.
///
/// A missing file yields an empty config. When the file is not valid YAML
/// even after Jinja stripping, only the `name:` line is recovered.
pub fn read_project_config(project_dir: &Path, max_bytes: u64) -> Result<ProjectConfig> {
    let path = project_dir.join(PROJECT_MANIFEST);
    if !path.is_file() {
        return Ok(ProjectConfig::default());
    }

    let raw = read_lossy_with_limit(&path, max_bytes)?;
    Ok(project_config_from_yaml(&raw))
}

/// Build a project config from the raw text of `dbt_project.yml`.
pub fn project_config_from_yaml(raw: &str) -> ProjectConfig {
    if let Some(data) = parse_mapping(raw) {
        return ProjectConfig {
            name: data.get("name").and_then(scalar_to_string),
            default_materializations: extract_default_materializations(&data),
        };
    }

    let name = PROJECT_NAME
        .captures(raw)
        .map(|caps| caps[1].trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|name| !name.is_empty());

    ProjectConfig {
        name,
        default_materializations: BTreeMap::new(),
    }
}

fn materialized_of(node: &Value) -> Option<&str> {
    node.get("+materialized")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .or_else(|| node.get("materialized").and_then(Value::as_str))
}

/// Collect directory-level defaults from the `models:` block.
///
/// `models.<project>.<dir>.+materialized: table` maps `dir` to `table`, at
/// any depth. Keys starting with `+` are config, not directories.
fn extract_default_materializations(config: &Value) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    let Some(models) = config.get("models").and_then(Value::as_mapping) else {
        return result;
    };

    for project_models in models.values() {
        if project_models.is_mapping() {
            walk_materializations(project_models, &mut result);
        }
    }

    result
}

fn walk_materializations(node: &Value, result: &mut BTreeMap<String, String>) {
    let Some(mapping) = node.as_mapping() else {
        return;
    };

    for (key, value) in mapping {
        let Some(key) = key.as_str() else {
            continue;
        };
        if key.starts_with('+') || !value.is_mapping() {
            continue;
        }
        if let Some(materialized) = materialized_of(value) {
            result.insert(key.to_string(), materialized.to_string());
        }
        walk_materializations(value, result);
    }
}

/// Find the default materialization for a model file.
///
/// Walks from the model's directory up to `models_dir` (inclusive) and
/// returns the first directory with a default, then the project-wide one.
pub fn resolve_default_materialization(
    sql_path: &Path,
    models_dir: &Path,
    defaults: &BTreeMap<String, String>,
) -> Option<String> {
    sql_path
        .ancestors()
        .skip(1)
        .take_while(|dir| dir.starts_with(models_dir))
        .filter_map(|dir| dir.file_name())
        .find_map(|name| defaults.get(&*name.to_string_lossy()))
        .or_else(|| defaults.get(ROOT_DEFAULT_KEY))
        .cloned()
}
