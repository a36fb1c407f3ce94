//! Indexed dbt objects.

use serde::{Deserialize, Serialize};

use crate::indexer::sql::SourceRef;

/// One SQL model of a dbt project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name (file stem).
    pub name: String,
    /// Path relative to the dbt project directory.
    pub path: String,
    /// Materialization from the model config or a directory default.
    pub materialized: Option<String>,
    /// Referenced models, sorted.
    pub refs: Vec<String>,
    /// Referenced `(source, table)` pairs, sorted.
    pub sources: Vec<SourceRef>,
    /// Description from a schema YAML file.
    pub description: Option<String>,
}

/// One `sources:` entry of a schema YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source name.
    pub name: String,
    /// Database, when it does not depend on the target.
    pub database: Option<String>,
    /// Schema name.
    pub schema_name: String,
    /// Table names, sorted.
    pub tables: Vec<String>,
}
