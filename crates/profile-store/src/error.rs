//! Error types for the profile store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while computing, caching or loading profiles.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Source file missing or unreadable, or the variable index is absent.
    #[error("data access failed for {run}: {reason}")]
    DataAccess { run: String, reason: String },

    /// No cache record exists yet for the (run, variable) pair.
    #[error("no cache record at {}", path.display())]
    CacheMiss { path: PathBuf },

    /// A cache record exists but cannot be turned back into a profile.
    #[error("malformed cache record {} (line {line}): {reason}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Writing a cache record failed.
    #[error("failed to write cache record {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The variable name is not in the catalog.
    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// Store configuration or catalog rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// Create a DataAccess error.
    pub fn data_access(run: impl ToString, reason: impl ToString) -> Self {
        Self::DataAccess {
            run: run.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a Parse error.
    pub fn parse(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }

    /// Create a Write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// The only kind the store recovers from on its own.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss { .. })
    }
}

/// Result type for profile store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
