//! Index command for Tributary.
//!
//! Builds `dbt-index/` from the dbt projects under `repos/`.

use serde::{Deserialize, Serialize};

use crate::cli::NOT_CONFIGURED_MESSAGE;
use crate::config::Config;
use crate::indexer::{index_all_projects, IndexReport};

/// Options for the index command.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the index command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOutput {
    /// Whether every project was indexed.
    pub success: bool,
    /// Whether a project root is configured.
    pub configured: bool,
    /// Indexed and failed projects.
    pub report: IndexReport,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IndexOutput {
    /// Create an output from a finished run.
    ///
    /// The run counts as failed when any project failed.
    pub fn from_report(report: IndexReport) -> Self {
        let error = if report.failed.is_empty() {
            None
        } else {
            Some(format!("{} project(s) failed to index", report.failed.len()))
        };

        Self {
            success: error.is_none(),
            configured: true,
            report,
            error,
        }
    }

    /// Create an output for a missing project root.
    pub fn not_configured() -> Self {
        Self {
            success: false,
            configured: false,
            report: IndexReport::default(),
            error: Some(NOT_CONFIGURED_MESSAGE.to_string()),
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            configured: true,
            report: IndexReport::default(),
            error: Some(error.into()),
        }
    }
}

/// The index command implementation.
pub struct IndexCommand {
    config: Config,
}

impl IndexCommand {
    /// Create a new index command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the index command.
    pub fn run(&self, _options: &IndexOptions) -> IndexOutput {
        let Some(root) = self.config.project_root() else {
            return IndexOutput::not_configured();
        };

        match index_all_projects(root, &self.config.indexer) {
            Ok(report) => IndexOutput::from_report(report),
            Err(err) => {
                tracing::warn!(operation = "index_all_projects", error = %err, "indexing failed");
                IndexOutput::failure(err.to_string())
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &IndexOutput, options: &IndexOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &IndexOutput) -> String {
        if !output.configured {
            return format!(
                "Index command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let report = &output.report;
        if report.is_empty() {
            return match &output.error {
                Some(error) => format!("Index command failed: {}\n", error),
                None => "No dbt projects found.\n".to_string(),
            };
        }

        let mut lines = Vec::new();

        for project in &report.indexed {
            lines.push(format!(
                "  [+] {} ({}): {} models, {} sources",
                project.repo_name, project.project_path, project.models, project.sources
            ));
        }
        for project in &report.failed {
            lines.push(format!("  [!] {}: {}", project.repo_name, project.error));
        }

        lines.push(String::new());
        lines.push(format!(
            "Indexed {} project(s), {} failed.",
            report.indexed.len(),
            report.failed.len()
        ));

        lines.join("\n") + "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::{FailedProject, IndexedProject};
    use std::fs;
    use tempfile::TempDir;

    fn indexed(name: &str) -> IndexedProject {
        IndexedProject {
            repo_name: name.to_string(),
            project_name: name.to_string(),
            project_path: format!("repos/{}", name),
            models: 2,
            sources: 1,
        }
    }

    #[test]
    fn test_index_not_configured() {
        let output = IndexCommand::new(Config::default()).run(&IndexOptions::default());

        assert!(!output.success);
        assert!(!output.configured);
    }

    #[test]
    fn test_index_writes_manifest() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repos/shop");
        fs::create_dir_all(repo.join("models")).unwrap();
        fs::write(repo.join("dbt_project.yml"), "name: shop\n").unwrap();
        fs::write(repo.join("models/orders.sql"), "select 1").unwrap();

        let cmd = IndexCommand::new(Config::default().with_project_root(temp.path()));
        let output = cmd.run(&IndexOptions::default());

        assert!(output.success);
        assert_eq!(output.report.indexed.len(), 1);
        assert_eq!(output.report.indexed[0].models, 1);
        assert!(temp.path().join("dbt-index/shop/manifest.md").is_file());
        assert!(temp.path().join("dbt-index/shop/sources.md").is_file());
    }

    #[test]
    fn test_index_without_projects() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("repos/docs")).unwrap();

        let cmd = IndexCommand::new(Config::default().with_project_root(temp.path()));
        let output = cmd.run(&IndexOptions::default());

        assert!(output.success);
        assert!(output.report.is_empty());
        assert!(!temp.path().join("dbt-index").exists());
        assert_eq!(
            cmd.format_output(&output, &IndexOptions::default()),
            "No dbt projects found.\n"
        );
    }

    #[test]
    fn test_from_report_with_failures() {
        let report = IndexReport {
            indexed: vec![indexed("shop")],
            failed: vec![FailedProject {
                repo_name: "broken".to_string(),
                error: "io error".to_string(),
            }],
        };

        let output = IndexOutput::from_report(report);
        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some("1 project(s) failed to index"));
    }

    #[test]
    fn test_format_output_human_readable() {
        let cmd = IndexCommand::new(Config::default());
        let output = IndexOutput::from_report(IndexReport {
            indexed: vec![indexed("shop")],
            failed: vec![FailedProject {
                repo_name: "broken".to_string(),
                error: "io error".to_string(),
            }],
        });

        let formatted = cmd.format_output(&output, &IndexOptions::default());
        assert!(formatted.contains("[+] shop (repos/shop): 2 models, 1 sources"));
        assert!(formatted.contains("[!] broken: io error"));
        assert!(formatted.contains("Indexed 1 project(s), 1 failed."));
    }

    #[test]
    fn test_format_output_json() {
        let cmd = IndexCommand::new(Config::default());
        let output = IndexOutput::from_report(IndexReport {
            indexed: vec![indexed("shop")],
            failed: Vec::new(),
        });
        let options = IndexOptions {
            json: true,
            ..Default::default()
        };

        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"success\": true"));
        assert!(formatted.contains("\"repo_name\": \"shop\""));
    }

    #[test]
    fn test_format_output_quiet() {
        let cmd = IndexCommand::new(Config::default());
        let output = IndexOutput::failure("boom");
        let options = IndexOptions {
            quiet: true,
            ..Default::default()
        };

        assert!(cmd.format_output(&output, &options).is_empty());
    }
}
