//! Status command for Tributary.
//!
//! One overview of the workspace: rules, repositories and connections,
//! exactly as the public discovery functions report them.

use serde::{Deserialize, Serialize};

use crate::cli::NOT_CONFIGURED_MESSAGE;
use crate::config::Config;
use crate::discovery::{load_rules, scan_connections, scan_repositories, Connection, Repository};

/// Options for the status command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Output as JSON.
    pub json: bool,
}

/// Output format for the status command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    /// Whether a project root is configured.
    pub configured: bool,
    /// The configured project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
    /// Whether `RULES.md` could be loaded.
    pub has_rules: bool,
    /// Repositories, or `None` when there are none to report.
    pub repositories: Option<Vec<Repository>>,
    /// Connections, or `None` when there are none to report.
    pub connections: Option<Vec<Connection>>,
}

/// The status command implementation.
pub struct StatusCommand {
    config: Config,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the status command.
    pub fn run(&self, _options: &StatusOptions) -> StatusOutput {
        let root = self.config.project_root();

        StatusOutput {
            configured: root.is_some(),
            project_root: root.map(|r| r.display().to_string()),
            has_rules: load_rules(root).is_some(),
            repositories: scan_repositories(root),
            connections: scan_connections(root),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatusOutput, options: &StatusOptions) -> String {
        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &StatusOutput) -> String {
        let Some(root) = &output.project_root else {
            return format!("{}\n", NOT_CONFIGURED_MESSAGE);
        };

        let mut lines = vec![format!("Project root: {}", root)];

        lines.push(format!(
            "Rules: {}",
            if output.has_rules { "RULES.md" } else { "none" }
        ));

        match &output.repositories {
            Some(repos) => {
                let projects = repos.iter().filter(|r| r.has_project).count();
                let indexed = repos.iter().filter(|r| r.indexed == Some(true)).count();
                lines.push(format!(
                    "Repositories: {} ({} dbt projects, {} indexed)",
                    repos.len(),
                    projects,
                    indexed
                ));
            }
            None => lines.push("Repositories: none".to_string()),
        }

        match &output.connections {
            Some(connections) => {
                let targets: Vec<String> = connections
                    .iter()
                    .map(|c| format!("{}/{}", c.connection_type, c.database))
                    .collect();
                lines.push(format!("Connections: {}", targets.join(", ")));
            }
            None => lines.push("Connections: none".to_string()),
        }

        lines.join("\n") + "\n"
    }
}
