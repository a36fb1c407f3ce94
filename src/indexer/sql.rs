//! SQL model parsing.
//!
//! Only the Jinja calls that matter for lineage are recognized:
//! `{{ ref('model') }}`, `{{ source('source', 'table') }}` and the
//! `materialized` key of `{{ config(...) }}`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

static REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*ref\(\s*['"]([^'"]+)['"]\s*\)\s*\}\}"#).expect("valid ref regex")
});

static SOURCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*source\(\s*['"]([^'"]+)['"]\s*,\s*['"]([^'"]+)['"]\s*\)\s*\}\}"#)
        .expect("valid source regex")
});

static MATERIALIZED_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\{\{\s*config\([^)]*materialized\s*=\s*['"]([^'"]+)['"]"#)
        .expect("valid config regex")
});

/// A `source('name', 'table')` reference.
pub type SourceRef = (String, String);

/// Extract `ref()` and `source()` calls from SQL.
///
/// Both lists are deduplicated and sorted.
pub fn parse_sql_dependencies(content: &str) -> (Vec<String>, Vec<SourceRef>) {
    let refs: BTreeSet<String> = REF_PATTERN
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect();

    let sources: BTreeSet<SourceRef> = SOURCE_PATTERN
        .captures_iter(content)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();

    (refs.into_iter().collect(), sources.into_iter().collect())
}

/// Extract config properties from SQL.
///
/// Currently only `materialized` is read.
pub fn parse_sql_config(content: &str) -> BTreeMap<String, String> {
    let mut config = BTreeMap::new();
    if let Some(caps) = MATERIALIZED_PATTERN.captures(content) {
        config.insert("materialized".to_string(), caps[1].to_string());
    }
    config
}
