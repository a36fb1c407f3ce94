//! Connection discovery for Tributary.
//!
//! Connections are declared by directory names, two levels deep:
//! `databases/type=<T>/database=<D>/`. Only the names matter; nothing
//! inside the leaf directories is read.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::discovery::{not_a_directory, ScanOutcome};
use crate::error::Result;
use crate::workspace::layout::{DATABASE_PREFIX, TYPE_PREFIX};
use crate::workspace::{DirEntry, DiskFs, WorkspaceFs, WorkspaceLayout};

/// One declared data connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Connection type, e.g. `postgres`.
    #[serde(rename = "type")]
    pub connection_type: String,
    /// Database name.
    pub database: String,
}

impl Connection {
    /// Create a new connection.
    pub fn new(connection_type: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            connection_type: connection_type.into(),
            database: database.into(),
        }
    }
}

/// Extract the value of a `key=value` directory name.
///
/// Returns `None` when the name lacks the prefix or the value is empty.
pub fn parse_key_value<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix).filter(|value| !value.is_empty())
}

/// Directory entries of `dir` whose names carry `prefix` with a non-empty value.
fn prefixed_dirs<F: WorkspaceFs + ?Sized>(
    fs: &F,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<(DirEntry, String)>> {
    Ok(fs
        .list_dir(dir)?
        .into_iter()
        .filter(|entry| entry.is_dir)
        .filter_map(|entry| {
            let value = parse_key_value(&entry.name, prefix)?.to_string();
            Some((entry, value))
        })
        .collect())
}

/// Scan `databases/` through the given filesystem.
pub fn scan_connections_with<F: WorkspaceFs + ?Sized>(
    fs: &F,
    root: Option<&Path>,
) -> ScanOutcome<Connection> {
    let Some(root) = root else {
        return ScanOutcome::NotConfigured;
    };

    let databases_dir = WorkspaceLayout::new(root).databases_dir();
    if !fs.exists(&databases_dir) {
        return ScanOutcome::Missing(databases_dir);
    }
    if !fs.is_dir(&databases_dir) {
        return ScanOutcome::Failed(not_a_directory(&databases_dir));
    }

    ScanOutcome::from_result(collect_connections(fs, &databases_dir))
}

fn collect_connections<F: WorkspaceFs + ?Sized>(
    fs: &F,
    databases_dir: &Path,
) -> Result<Vec<Connection>> {
    let mut connections = Vec::new();

    for (type_entry, connection_type) in prefixed_dirs(fs, databases_dir, TYPE_PREFIX)? {
        let type_dir = databases_dir.join(&type_entry.file_name);
        for (_, database) in prefixed_dirs(fs, &type_dir, DATABASE_PREFIX)? {
            connections.push(Connection::new(connection_type.clone(), database));
        }
    }

    tracing::debug!(count = connections.len(), "scanned connections");
    Ok(connections)
}

/// Scan `databases/` on disk.
///
/// Returns `None` when no root is configured, `databases/` is missing, no
/// valid pair exists, or the scan fails.
pub fn scan_connections(root: Option<&Path>) -> Option<Vec<Connection>> {
    scan_connections_with(&DiskFs::new(), root).into_option("scan_connections")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::MemoryFs;
    use std::fs;
    use tempfile::TempDir;

    fn ws() -> Option<&'static Path> {
        Some(Path::new("/ws"))
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("type=postgres", "type="), Some("postgres"));
        assert_eq!(parse_key_value("type=", "type="), None);
        assert_eq!(parse_key_value("kind=postgres", "type="), None);
        assert_eq!(parse_key_value("type=a=b", "type="), Some("a=b"));
        assert_eq!(parse_key_value("Type=postgres", "type="), None);
    }

    #[test]
    fn test_no_root_returns_none() {
        assert_eq!(scan_connections(None), None);
    }

    #[test]
    fn test_missing_databases_dir_returns_none() {
        let temp = TempDir::new().unwrap();
        assert_eq!(scan_connections(Some(temp.path())), None);
    }

    #[test]
    fn test_databases_is_a_file_returns_none() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("databases"), "not a dir").unwrap();

        let outcome = scan_connections_with(&DiskFs::new(), Some(temp.path()));
        assert!(matches!(
            outcome,
            ScanOutcome::Failed(crate::error::TributaryError::Discovery { .. })
        ));
        assert_eq!(scan_connections(Some(temp.path())), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_type_dir_is_descended() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let type_dir = temp
            .path()
            .join("databases")
            .join(OsStr::from_bytes(b"type=pg\xe9"));
        fs::create_dir_all(type_dir.join("database=sales")).unwrap();

        let connections = scan_connections(Some(temp.path())).unwrap();
        assert_eq!(connections, vec![Connection::new("pg\u{fffd}", "sales")]);
    }

    #[test]
    fn test_two_databases_share_type() {
        let temp = TempDir::new().unwrap();
        let type_dir = temp.path().join("databases/type=postgres");
        fs::create_dir_all(type_dir.join("database=sales")).unwrap();
        fs::create_dir_all(type_dir.join("database=marketing")).unwrap();

        let mut connections = scan_connections(Some(temp.path())).unwrap();
        connections.sort_by(|a, b| a.database.cmp(&b.database));
        assert_eq!(
            connections,
            vec![
                Connection::new("postgres", "marketing"),
                Connection::new("postgres", "sales"),
            ]
        );
    }

    #[test]
    fn test_empty_type_value_contributes_nothing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("databases/type=/database=x")).unwrap();

        assert_eq!(scan_connections(Some(temp.path())), None);
    }

    #[test]
    fn test_empty_database_value_is_skipped() {
        let fs = MemoryFs::new();
        fs.add_dir("/ws/databases/type=snowflake/database=")
            .add_dir("/ws/databases/type=snowflake/database=prod");

        let connections = scan_connections_with(&fs, ws()).into_option("test").unwrap();
        assert_eq!(connections, vec![Connection::new("snowflake", "prod")]);
    }

    #[test]
    fn test_ignores_files_and_unprefixed_dirs() {
        let fs = MemoryFs::new();
        fs.add_file("/ws/databases/type=file", "")
            .add_dir("/ws/databases/misc/database=x")
            .add_dir("/ws/databases/type=duckdb/notes")
            .add_file("/ws/databases/type=duckdb/database=file.txt", "")
            .add_dir("/ws/databases/type=duckdb/database=local");

        let connections = scan_connections_with(&fs, ws()).into_option("test").unwrap();
        assert_eq!(connections, vec![Connection::new("duckdb", "local")]);
    }

    #[test]
    fn test_nested_enumeration_order_without_dedup() {
        let fs = MemoryFs::new();
        fs.add_dir("/ws/databases/type=postgres/database=sales")
            .add_dir("/ws/databases/type=bigquery/database=sales")
            .add_dir("/ws/databases/type=postgres/database=marketing")
            .add_dir("/ws/databases/type=bigquery/database=events");

        let connections = scan_connections_with(&fs, ws()).into_option("test").unwrap();
        assert_eq!(
            connections,
            vec![
                Connection::new("postgres", "sales"),
                Connection::new("postgres", "marketing"),
                Connection::new("bigquery", "sales"),
                Connection::new("bigquery", "events"),
            ]
        );
    }

    #[test]
    fn test_failure_inside_type_dir_discards_partial_results() {
        let fs = MemoryFs::new();
        fs.add_dir("/ws/databases/type=postgres/database=sales")
            .add_dir("/ws/databases/type=mysql/database=crm")
            .fail_on("/ws/databases/type=mysql");

        let outcome = scan_connections_with(&fs, ws());
        assert!(outcome.is_failed());
        assert_eq!(outcome.into_option("scan_connections"), None);
    }

    #[test]
    fn test_type_without_databases_returns_none() {
        let fs = MemoryFs::new();
        fs.add_dir("/ws/databases/type=postgres");

        let outcome = scan_connections_with(&fs, ws());
        assert!(matches!(outcome, ScanOutcome::Empty));
    }

    #[test]
    fn test_serializes_type_key() {
        let value = serde_json::to_value(Connection::new("postgres", "sales")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"type": "postgres", "database": "sales"})
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: any non-empty value round-trips through the prefix
            #[test]
            fn prop_prefixed_value_is_extracted(value in "[a-zA-Z0-9_=.-]{1,20}") {
                let name = format!("database={}", value);
                prop_assert_eq!(parse_key_value(&name, "database="), Some(value.as_str()));
            }

            // Property: names without the prefix never match
            #[test]
            fn prop_unprefixed_names_rejected(name in "[a-z]{0,8}") {
                prop_assume!(!name.starts_with("type="));
                prop_assert_eq!(parse_key_value(&name, "type="), None);
            }
        }
    }
}
