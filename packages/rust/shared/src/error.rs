//! Error types for NoahAid.
//!
//! Library crates use [`NoahAidError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.
//!
//! Empty input and "no matching topic" are ordinary outcomes, not errors.

use std::path::PathBuf;

/// Top-level error type for all NoahAid operations.
#[derive(Debug, thiserror::Error)]
pub enum NoahAidError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Knowledge base (or other resource) could not be deserialized.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (duplicate topic id, empty step list, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The reply scheduler could not be created or used.
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NoahAidError>;

impl NoahAidError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
