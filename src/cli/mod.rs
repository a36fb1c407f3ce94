//! CLI commands for Tributary.
//!
//! This module provides CLI commands for Tributary, organized into:
//! - **Discovery commands**: rules, repos, connections (read-only)
//! - **Index command**: index (writes `dbt-index/`)
//! - **Overview command**: status

// Discovery commands
pub mod connections_cmd;
pub mod repos_cmd;
pub mod rules_cmd;

// Index command
pub mod index_cmd;

// Overview command
pub mod status_cmd;

pub use connections_cmd::ConnectionsCommand;
pub use index_cmd::IndexCommand;
pub use repos_cmd::ReposCommand;
pub use rules_cmd::RulesCommand;
pub use status_cmd::StatusCommand;

/// Message shown when no project root is configured.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "No project root configured. Set TRIBUTARY_PROJECT_ROOT or pass --root.";
