//! Schema YAML parsing.
//!
//! dbt YAML files routinely embed Jinja, which is not valid YAML. Blocks
//! (`{% ... %}`) are removed and expressions (`{{ ... }}`) are replaced with
//! an empty string literal before parsing. Files that still fail to parse
//! contribute nothing.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::error::Result;
use crate::indexer::model::SourceInfo;
use crate::util::read_lossy_with_limit;

static JINJA_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{%.*?%\}").expect("valid jinja block regex"));

static JINJA_EXPR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}").expect("valid jinja expression regex"));

/// Remove Jinja so the text can be parsed as YAML.
pub fn strip_jinja(text: &str) -> String {
    let without_blocks = JINJA_BLOCK.replace_all(text, "");
    JINJA_EXPR.replace_all(&without_blocks, "\"\"").into_owned()
}

/// Parse Jinja-stripped YAML into a mapping, if it is one.
pub(crate) fn parse_mapping(text: &str) -> Option<Value> {
    let cleaned = strip_jinja(text);
    match serde_yaml::from_str::<Value>(&cleaned) {
        Ok(value) if value.is_mapping() => Some(value),
        Ok(_) => None,
        Err(err) => {
            tracing::debug!(error = %err, "yaml parse failed after jinja stripping");
            None
        }
    }
}

/// Render a YAML scalar as text. Null and collections yield `None`.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn sequence<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Extract source definitions from schema YAML text.
pub fn sources_from_yaml(text: &str) -> Vec<SourceInfo> {
    let Some(data) = parse_mapping(text) else {
        return Vec::new();
    };

    let mut results = Vec::new();
    for source in sequence(&data, "sources") {
        if !source.is_mapping() {
            continue;
        }

        let name = source.get("name").and_then(scalar_to_string).unwrap_or_default();
        if name.is_empty() {
            continue;
        }

        // Multi-line Jinja conditionals can leave one value per branch.
        let database = source
            .get("database")
            .and_then(scalar_to_string)
            .and_then(|db| {
                db.lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .map(str::to_string)
            });

        let schema_name = source
            .get("schema")
            .and_then(scalar_to_string)
            .unwrap_or_default();

        let mut tables: Vec<String> = sequence(source, "tables")
            .iter()
            .filter_map(|table| table.get("name").and_then(scalar_to_string))
            .filter(|table| !table.is_empty())
            .collect();
        tables.sort();

        results.push(SourceInfo {
            name,
            database,
            schema_name,
            tables,
        });
    }

    results
}

/// Extract model descriptions from schema YAML text.
///
/// `{{ doc(...) }}` references and empty descriptions are skipped.
pub fn descriptions_from_yaml(text: &str) -> BTreeMap<String, String> {
    let Some(data) = parse_mapping(text) else {
        return BTreeMap::new();
    };

    let mut result = BTreeMap::new();
    for model in sequence(&data, "models") {
        let name = model.get("name").and_then(Value::as_str).unwrap_or_default();
        let description = model
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();

        if !name.is_empty() && !description.is_empty() && !description.starts_with("{{") {
            result.insert(name.to_string(), description.trim().to_string());
        }
    }

    result
}

/// Parse source definitions from a schema YAML file.
pub fn parse_yaml_sources(path: &Path, max_bytes: u64) -> Result<Vec<SourceInfo>> {
    Ok(sources_from_yaml(&read_lossy_with_limit(path, max_bytes)?))
}

/// Parse model descriptions from a schema YAML file.
pub fn parse_yaml_descriptions(path: &Path, max_bytes: u64) -> Result<BTreeMap<String, String>> {
    Ok(descriptions_from_yaml(&read_lossy_with_limit(path, max_bytes)?))
}
