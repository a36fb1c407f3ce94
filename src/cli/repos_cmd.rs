//! Repos command for Tributary.
//!
//! Lists the repositories under `repos/` with their dbt project and index
//! status.

use serde::{Deserialize, Serialize};

use crate::cli::NOT_CONFIGURED_MESSAGE;
use crate::config::Config;
use crate::discovery::{scan_repositories_with, Repository, ScanOutcome};
use crate::workspace::DiskFs;

/// Options for the repos command.
#[derive(Debug, Clone, Default)]
pub struct ReposOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the repos command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReposOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Whether a project root is configured.
    pub configured: bool,
    /// Scan outcome: `found`, `empty`, `missing`, `not_configured` or `failed`.
    pub status: String,
    /// Discovered repositories in enumeration order.
    pub repositories: Vec<Repository>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReposOutput {
    /// Build the output from a scan outcome.
    pub fn from_outcome(outcome: ScanOutcome<Repository>) -> Self {
        let status = outcome.label().to_string();
        match outcome {
            ScanOutcome::NotConfigured => Self {
                success: false,
                configured: false,
                status,
                repositories: Vec::new(),
                error: Some(NOT_CONFIGURED_MESSAGE.to_string()),
            },
            ScanOutcome::Failed(err) => {
                tracing::warn!(operation = "scan_repositories", error = %err, "repository scan failed");
                Self {
                    success: false,
                    configured: true,
                    status,
                    repositories: Vec::new(),
                    error: Some(err.to_string()),
                }
            }
            ScanOutcome::Found(repositories) => Self {
                success: true,
                configured: true,
                status,
                repositories,
                error: None,
            },
            ScanOutcome::Missing(_) | ScanOutcome::Empty => Self {
                success: true,
                configured: true,
                status,
                repositories: Vec::new(),
                error: None,
            },
        }
    }
}

/// The repos command implementation.
pub struct ReposCommand {
    config: Config,
}

impl ReposCommand {
    /// Create a new repos command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the repos command.
    pub fn run(&self, _options: &ReposOptions) -> ReposOutput {
        let outcome = scan_repositories_with(&DiskFs::new(), self.config.project_root());
        ReposOutput::from_outcome(outcome)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ReposOutput, options: &ReposOptions) -> String {
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
    fn format_human_readable(&self, output: &ReposOutput) -> String {
        if !output.success {
            return format!(
                "Repos command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        match output.status.as_str() {
            "missing" => return "No repos/ directory found.\n".to_string(),
            "empty" => return "No repositories found in repos/.\n".to_string(),
            _ => {}
        }

        let mut lines = vec!["Repositories:\n".to_string()];

        for repo in &output.repositories {
            let line = match (&repo.project_path, repo.indexed) {
                (Some(path), Some(true)) => format!("  [+] {} ({}, indexed)", repo.name, path),
                (Some(path), _) => format!("  [~] {} ({}, not indexed)", repo.name, path),
                (None, _) => format!("  [-] {} (no dbt project)", repo.name),
            };
            lines.push(line);
        }

        let projects = output.repositories.iter().filter(|r| r.has_project).count();
        let indexed = output
            .repositories
            .iter()
            .filter(|r| r.indexed == Some(true))
            .count();

        lines.push(String::new());
        lines.push(format!(
            "{} repositories, {} dbt projects, {} indexed",
            output.repositories.len(),
            projects,
            indexed
        ));

        lines.join("\n") + "\n"
    }
}
