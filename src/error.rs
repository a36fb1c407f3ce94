//! Unified error types for Tributary with fail-open philosophy.
//!
//! Discovery never blocks the caller: when a scan fails we log a warning and
//! hand back a safe default instead of propagating the failure. The indexer
//! and the CLI use the same error type but surface it where they need to.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Tributary operations.
#[derive(Error, Debug)]
pub enum TributaryError {
    /// Filesystem errors while reading or writing the workspace.
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Workspace discovery errors.
    #[error("discovery error: {message}")]
    Discovery { message: String },

    /// dbt indexing errors.
    #[error("index error: {message}")]
    Index { message: String },

    /// YAML, JSON or SQL parsing errors.
    #[error("parse error: {message}")]
    Parse { message: String },
}

/// A specialized Result type for Tributary operations.
pub type Result<T> = std::result::Result<T, TributaryError>;

impl TributaryError {
    /// Create an I/O error bound to a path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a discovery error.
    pub fn discovery(message: impl Into<String>) -> Self {
        Self::Discovery {
            message: message.into(),
        }
    }

    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

impl From<io::Error> for TributaryError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for TributaryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for TributaryError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

/// Trait for fail-open error handling.
///
/// Log the error and return a safe value instead of propagating it.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;

    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(operation = context, error = %err, "fail-open: using default");
                T::default()
            }
        }
    }

    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(operation = context, error = %err, "fail-open: using fallback");
                fallback
            }
        }
    }
}

/// Exit codes for the Tributary CLI.
pub mod exit_codes {
    /// The command completed.
    pub const SUCCESS: i32 = 0;

    /// The command failed.
    pub const ERROR: i32 = 1;

    /// No project root is configured.
    pub const NOT_CONFIGURED: i32 = 2;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
