//! Configuration loading for Tributary.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.tributary/config.toml`)
//! 3. User config (`~/.tributary/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. Without a project root, discovery reports
//! "not configured" instead of failing.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TributaryError};
use crate::util::MAX_FILE_SIZE;

/// Environment variable holding the workspace root.
pub const ENV_PROJECT_ROOT: &str = "TRIBUTARY_PROJECT_ROOT";
/// Environment variable overriding the indexer file size limit.
pub const ENV_MAX_FILE_BYTES: &str = "TRIBUTARY_MAX_FILE_BYTES";
/// Environment variable overriding the Tributary home directory.
pub const ENV_HOME: &str = "TRIBUTARY_HOME";

/// Directories never descended into while indexing.
pub const DEFAULT_SKIP_DIRS: &[&str] = &["dbt_packages", "dbt_modules", "target", "logs", ".git"];

/// Main configuration struct for Tributary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Workspace root holding `repos/`, `dbt-index/` and `databases/`.
    pub project_root: Option<PathBuf>,
    /// dbt indexer configuration.
    pub indexer: IndexerConfig,
}

/// dbt indexer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexerConfig {
    /// Directory names pruned from the `models/` walk.
    pub skip_dirs: Vec<String>,
    /// Largest SQL or YAML file read, in bytes.
    pub max_file_bytes: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|s| s.to_string()).collect(),
            max_file_bytes: MAX_FILE_SIZE,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain, resolving relative
    /// paths against `cwd`.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides(cwd);

        config
    }

    /// Load user config from `~/.tributary/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = tributary_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    /// Load project config from `.tributary/config.toml` in the given directory.
    ///
    /// A relative `project_root` in this file is resolved against `cwd`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let mut config = Self::load_optional(&cwd.join(".tributary").join("config.toml"))?;
        config.project_root = config.project_root.map(|root| absolutize(&root, cwd));
        Some(config)
    }

    /// Load a config file that may legitimately be absent.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.is_file() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| TributaryError::io(path, e))?;
        toml::from_str(&content).map_err(|e| TributaryError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self, cwd: &Path) {
        // TRIBUTARY_PROJECT_ROOT
        if let Ok(val) = env::var(ENV_PROJECT_ROOT) {
            if val.trim().is_empty() {
                tracing::warn!("{} is empty, ignoring", ENV_PROJECT_ROOT);
            } else {
                self.project_root = Some(absolutize(Path::new(&val), cwd));
            }
        }

        // TRIBUTARY_MAX_FILE_BYTES
        if let Ok(val) = env::var(ENV_MAX_FILE_BYTES) {
            match val.parse::<u64>() {
                Ok(n) if n > 0 => self.indexer.max_file_bytes = n,
                _ => tracing::warn!(
                    "Invalid {} value '{}'. Expected a positive integer. Using '{}'.",
                    ENV_MAX_FILE_BYTES,
                    val,
                    self.indexer.max_file_bytes
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Non-default fields of `other` win. As with any default-comparison
    /// merge, a layer cannot reset a field back to its default.
    fn merge(mut self, other: Config) -> Self {
        if other.project_root.is_some() {
            self.project_root = other.project_root;
        }

        let default_indexer = IndexerConfig::default();
        if other.indexer.skip_dirs != default_indexer.skip_dirs {
            self.indexer.skip_dirs = other.indexer.skip_dirs;
        }
        if other.indexer.max_file_bytes != default_indexer.max_file_bytes {
            self.indexer.max_file_bytes = other.indexer.max_file_bytes;
        }

        self
    }

    /// Replace the project root, e.g. from a CLI flag.
    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// The configured project root, if any.
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }
}

/// Resolve a relative path against `base`.
fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_relative() {
        base.join(path)
    } else {
        path.to_path_buf()
    }
}

/// Get the Tributary home directory.
///
/// Checks `TRIBUTARY_HOME` first, then falls back to `~/.tributary`.
/// An empty `TRIBUTARY_HOME` is ignored.
pub fn tributary_home() -> Option<PathBuf> {
    if let Ok(home) = env::var(ENV_HOME) {
        if home.is_empty() {
            tracing::warn!("{} is empty, using default", ENV_HOME);
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("{} is relative and doesn't exist, using as-is", ENV_HOME);
            return Some(path);
        }
    }

    dirs::home_dir().map(|home| home.join(".tributary"))
}
