//! Markdown rendering of index artifacts.
//!
//! `manifest.md` lists every model of a project; `sources.md` maps dbt
//! sources to databases and schemas.

use chrono::{DateTime, Utc};

use crate::indexer::model::{ModelInfo, SourceInfo};

const EMPTY_LIST: &str = "\u{2014}";

/// Render `manifest.md` stamped with the current time.
pub fn generate_manifest_md(
    models: &[ModelInfo],
    repo_name: &str,
    project_path: &str,
    project_name: &str,
) -> String {
    render_manifest(models, repo_name, project_path, project_name, Utc::now())
}

/// Render `manifest.md` stamped with `indexed_at`.
pub fn render_manifest(
    models: &[ModelInfo],
    repo_name: &str,
    project_path: &str,
    project_name: &str,
    indexed_at: DateTime<Utc>,
) -> String {
    let mut lines = vec![
        format!("# dbt Models Index: {}", repo_name),
        String::new(),
        format!("- **Project name:** {}", project_name),
        format!("- **dbt project path:** {}", project_path),
        format!("- **Total models:** {}", models.len()),
        format!("- **Indexed at:** {}", indexed_at.format("%Y-%m-%dT%H:%M:%S")),
        String::new(),
        "---".to_string(),
    ];

    for model in models {
        lines.push(String::new());
        lines.push(format!("### {}", model.name));
        lines.push(format!("- **path:** {}", model.path));

        if let Some(materialized) = &model.materialized {
            lines.push(format!("- **materialized:** {}", materialized));
        }

        let refs = if model.refs.is_empty() {
            EMPTY_LIST.to_string()
        } else {
            model.refs.join(", ")
        };
        lines.push(format!("- **refs:** {}", refs));

        let sources = if model.sources.is_empty() {
            EMPTY_LIST.to_string()
        } else {
            model
                .sources
                .iter()
                .map(|(source, table)| format!("{}.{}", source, table))
                .collect::<Vec<_>>()
                .join(", ")
        };
        lines.push(format!("- **sources:** {}", sources));

        if let Some(description) = &model.description {
            lines.push(format!("- **description:** {}", description));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Render `sources.md`, sources sorted by name.
pub fn generate_sources_md(sources: &[SourceInfo], repo_name: &str) -> String {
    let mut lines = vec![format!("# dbt Sources: {}", repo_name), String::new()];

    let mut sorted: Vec<&SourceInfo> = sources.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    for source in sorted {
        lines.push(format!("### {}", source.name));

        match &source.database {
            Some(database) => lines.push(format!("- **Database:** {}", database)),
            None => lines.push("- **Database:** (varies by target)".to_string()),
        }

        lines.push(format!("- **Schema:** {}", source.schema_name));

        if !source.tables.is_empty() {
            lines.push(format!("- **Tables:** {}", source.tables.join(", ")));
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stg_users() -> ModelInfo {
        ModelInfo {
            name: "stg_users".to_string(),
            path: "models/staging/stg_users.sql".to_string(),
            materialized: Some("view".to_string()),
            refs: vec![],
            sources: vec![("raw".to_string(), "users".to_string())],
            description: Some("Staged users".to_string()),
        }
    }

    #[test]
    fn test_manifest_output() {
        let md = generate_manifest_md(&[stg_users()], "my-repo", "repos/my-repo/dbt", "my_dbt");

        assert!(md.contains("# dbt Models Index: my-repo"));
        assert!(md.contains("- **Project name:** my_dbt"));
        assert!(md.contains("- **dbt project path:** repos/my-repo/dbt"));
        assert!(md.contains("### stg_users"));
        assert!(md.contains("**materialized:** view"));
        assert!(md.contains("- **refs:** \u{2014}"));
        assert!(md.contains("raw.users"));
        assert!(md.contains("**description:** Staged users"));
        assert!(md.contains("**Total models:** 1"));
        assert!(md.ends_with('\n'));
    }

    #[test]
    fn test_manifest_timestamp() {
        let at = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        let md = render_manifest(&[], "r", "repos/r", "r", at);

        assert!(md.contains("- **Indexed at:** 2026-03-04T05:06:07"));
        assert!(md.contains("**Total models:** 0"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn test_manifest_omits_missing_fields() {
        let model = ModelInfo {
            materialized: None,
            description: None,
            sources: vec![],
            refs: vec!["a".to_string(), "b".to_string()],
            ..stg_users()
        };
        let md = generate_manifest_md(&[model], "r", "repos/r", "r");

        assert!(!md.contains("materialized"));
        assert!(!md.contains("description"));
        assert!(md.contains("- **refs:** a, b"));
        assert!(md.contains("- **sources:** \u{2014}"));
    }

    #[test]
    fn test_sources_output() {
        let sources = vec![
            SourceInfo {
                name: "raw".to_string(),
                database: Some("prod_datalake".to_string()),
                schema_name: "RAW_DATA".to_string(),
                tables: vec!["users".to_string(), "orders".to_string()],
            },
            SourceInfo {
                name: "events".to_string(),
                database: None,
                schema_name: "EVENTS".to_string(),
                tables: vec![],
            },
        ];

        let md = generate_sources_md(&sources, "my-repo");
        assert!(md.contains("# dbt Sources: my-repo"));
        assert!(md.contains("### raw"));
        assert!(md.contains("**Database:** prod_datalake"));
        assert!(md.contains("**Schema:** RAW_DATA"));
        assert!(md.contains("users, orders"));
        assert!(md.contains("**Database:** (varies by target)"));
        assert!(md.find("### events").unwrap() < md.find("### raw").unwrap());
    }
}
