//! Connections command for Tributary.
//!
//! Lists the `databases/type=<T>/database=<D>` pairs of the workspace.

use serde::{Deserialize, Serialize};

use crate::cli::NOT_CONFIGURED_MESSAGE;
use crate::config::Config;
use crate::discovery::{scan_connections_with, Connection, ScanOutcome};
use crate::workspace::DiskFs;

/// Options for the connections command.
#[derive(Debug, Clone, Default)]
pub struct ConnectionsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the connections command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Whether a project root is configured.
    pub configured: bool,
    /// Scan outcome label.
    pub status: String,
    /// Discovered connections in enumeration order.
    pub connections: Vec<Connection>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectionsOutput {
    /// Build the output from a scan outcome.
    pub fn from_outcome(outcome: ScanOutcome<Connection>) -> Self {
        let status = outcome.label().to_string();
        let (success, configured, connections, error) = match outcome {
            ScanOutcome::NotConfigured => {
                (false, false, Vec::new(), Some(NOT_CONFIGURED_MESSAGE.to_string()))
            }
            ScanOutcome::Failed(err) => {
                tracing::warn!(operation = "scan_connections", error = %err, "connection scan failed");
                (false, true, Vec::new(), Some(err.to_string()))
            }
            ScanOutcome::Found(connections) => (true, true, connections, None),
            ScanOutcome::Missing(_) | ScanOutcome::Empty => (true, true, Vec::new(), None),
        };

        Self {
            success,
            configured,
            status,
            connections,
            error,
        }
    }
}

/// The connections command implementation.
pub struct ConnectionsCommand {
    config: Config,
}

impl ConnectionsCommand {
    /// Create a new connections command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the connections command.
    pub fn run(&self, _options: &ConnectionsOptions) -> ConnectionsOutput {
        let outcome = scan_connections_with(&DiskFs::new(), self.config.project_root());
        ConnectionsOutput::from_outcome(outcome)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ConnectionsOutput, options: &ConnectionsOptions) -> String {
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
    fn format_human_readable(&self, output: &ConnectionsOutput) -> String {
        if !output.success {
            return format!(
                "Connections command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.status == "missing" {
            return "No databases/ directory found.\n".to_string();
        }
        if output.connections.is_empty() {
            return "No connections declared.\n".to_string();
        }

        let mut lines = vec!["Connections:\n".to_string()];
        for connection in &output.connections {
            lines.push(format!(
                "  {}: {}",
                connection.connection_type, connection.database
            ));
        }

        lines.join("\n") + "\n"
    }
}
