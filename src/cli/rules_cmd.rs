//! Rules command for Tributary.
//!
//! Prints the workspace `RULES.md` document.

use serde::{Deserialize, Serialize};

use crate::cli::NOT_CONFIGURED_MESSAGE;
use crate::config::Config;
use crate::discovery::read_rules;
use crate::workspace::DiskFs;

/// Options for the rules command.
#[derive(Debug, Clone, Default)]
pub struct RulesOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the rules command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesOutput {
    /// Whether the command was successful.
    pub success: bool,
    /// Whether a project root is configured.
    pub configured: bool,
    /// The rules text, if the file exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    /// Error message if command failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RulesOutput {
    /// Create a successful output.
    pub fn success(rules: Option<String>) -> Self {
        Self {
            success: true,
            configured: true,
            rules,
            error: None,
        }
    }

    /// Create an output for a missing project root.
    pub fn not_configured() -> Self {
        Self {
            success: false,
            configured: false,
            rules: None,
            error: Some(NOT_CONFIGURED_MESSAGE.to_string()),
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            configured: true,
            rules: None,
            error: Some(error.into()),
        }
    }
}

/// The rules command implementation.
pub struct RulesCommand {
    config: Config,
}

impl RulesCommand {
    /// Create a new rules command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the rules command.
    pub fn run(&self, _options: &RulesOptions) -> RulesOutput {
        let Some(root) = self.config.project_root() else {
            return RulesOutput::not_configured();
        };

        match read_rules(&DiskFs::new(), Some(root)) {
            Ok(rules) => RulesOutput::success(rules),
            Err(err) => {
                tracing::warn!(operation = "load_rules", error = %err, "failed to read rules");
                RulesOutput::failure(err.to_string())
            }
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RulesOutput, options: &RulesOptions) -> String {
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
    fn format_human_readable(&self, output: &RulesOutput) -> String {
        if !output.success {
            return format!(
                "Rules command failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        match &output.rules {
            Some(rules) if rules.ends_with('\n') => rules.clone(),
            Some(rules) => format!("{}\n", rules),
            None => "No RULES.md found.\n".to_string(),
        }
    }
}
