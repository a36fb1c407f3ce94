//! Tributary - workspace discovery for data project folders
//!
//! CLI entry point with global panic handler.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tributary::cli::connections_cmd::{ConnectionsCommand, ConnectionsOptions};
use tributary::cli::index_cmd::{IndexCommand, IndexOptions};
use tributary::cli::repos_cmd::{ReposCommand, ReposOptions};
use tributary::cli::rules_cmd::{RulesCommand, RulesOptions};
use tributary::cli::status_cmd::{StatusCommand, StatusOptions};
use tributary::config::{tributary_home, Config};
use tributary::error::exit_codes;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "TRIBUTARY_LOG";

// =============================================================================
// CLI Definition
// =============================================================================

/// Tributary - workspace discovery for data project folders
#[derive(Parser)]
#[command(name = "tributary")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Workspace root (overrides TRIBUTARY_PROJECT_ROOT and config files)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the workspace RULES.md
    Rules {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List repositories under repos/ and their index status
    Repos {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List connections declared under databases/
    Connections {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Build dbt-index/ from the dbt projects under repos/
    Index {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show an overview of the workspace
    Status {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("tributary error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Install the stderr log subscriber, filtered by `TRIBUTARY_LOG`.
fn setup_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.tributary/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("tributary panic: {}", info);

        if let Some(home) = tributary_home() {
            let crash_log = home.join("crash.log");
            if std::fs::create_dir_all(&home).is_ok() {
                if let Ok(mut file) = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&crash_log)
                {
                    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                    let _ = writeln!(file, "[{}] {}", timestamp, info);
                }
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let config = load_config(&cwd, cli.root);

    match cli.command {
        Commands::Rules { json, quiet } => Ok(run_rules(config, json, quiet)),
        Commands::Repos { json, quiet } => Ok(run_repos(config, json, quiet)),
        Commands::Connections { json, quiet } => Ok(run_connections(config, json, quiet)),
        Commands::Index { json, quiet } => Ok(run_index(config, json, quiet)),
        Commands::Status { json } => Ok(run_status(config, json)),
    }
}

/// Load configuration, letting `--root` override everything else.
fn load_config(cwd: &Path, root: Option<PathBuf>) -> Config {
    let config = Config::load_from_cwd(cwd);
    match root {
        Some(root) if root.is_relative() => config.with_project_root(cwd.join(root)),
        Some(root) => config.with_project_root(root),
        None => config,
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

/// Map a command result to an exit code.
fn to_exit_code(configured: bool, success: bool) -> ExitCode {
    if !configured {
        ExitCode::from(exit_codes::NOT_CONFIGURED as u8)
    } else if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn print_formatted(formatted: &str) {
    if !formatted.is_empty() {
        print!("{}", formatted);
        if !formatted.ends_with('\n') {
            println!();
        }
    }
}

fn run_rules(config: Config, json: bool, quiet: bool) -> ExitCode {
    let cmd = RulesCommand::new(config);
    let options = RulesOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    to_exit_code(output.configured, output.success)
}

fn run_repos(config: Config, json: bool, quiet: bool) -> ExitCode {
    let cmd = ReposCommand::new(config);
    let options = ReposOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    to_exit_code(output.configured, output.success)
}

fn run_connections(config: Config, json: bool, quiet: bool) -> ExitCode {
    let cmd = ConnectionsCommand::new(config);
    let options = ConnectionsOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    to_exit_code(output.configured, output.success)
}

fn run_index(config: Config, json: bool, quiet: bool) -> ExitCode {
    let cmd = IndexCommand::new(config);
    let options = IndexOptions { json, quiet };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    to_exit_code(output.configured, output.success)
}

fn run_status(config: Config, json: bool) -> ExitCode {
    let cmd = StatusCommand::new(config);
    let options = StatusOptions { json };

    let output = cmd.run(&options);
    print_formatted(&cmd.format_output(&output, &options));

    to_exit_code(output.configured, true)
}
