//! Tributary - workspace discovery for data project folders
//!
//! Tributary answers what lives inside a data workspace: the optional
//! `RULES.md` document, the dbt repositories under `repos/` and whether
//! each has been indexed into `dbt-index/`, and the connections declared
//! as `databases/type=<T>/database=<D>` directories. It also builds the
//! `dbt-index/` artifacts from the repositories' dbt projects.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod indexer;
pub mod util;
pub mod workspace;

pub use config::{tributary_home, Config, IndexerConfig};
pub use discovery::{
    load_rules, scan_connections, scan_repositories, Connection, ProjectLocation, Repository,
    ScanOutcome,
};
pub use error::{FailOpen, Result, TributaryError};
pub use indexer::{index_all_projects, index_dbt_project, IndexReport, ModelInfo, SourceInfo};
pub use workspace::{DiskFs, MemoryFs, WorkspaceFs, WorkspaceLayout};

// CLI commands
pub use cli::{ConnectionsCommand, IndexCommand, ReposCommand, RulesCommand, StatusCommand};
