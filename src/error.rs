//! Error types for siteplan.
//!
//! The core algorithms are infallible. Errors come only from batch
//! validation, argument parsing, config loading, the result store, and the
//! one external classification call.

use std::path::PathBuf;

/// Top-level error type for all siteplan operations.
#[derive(Debug, thiserror::Error)]
pub enum SiteplanError {
    /// The parsed keyword batch is empty.
    #[error("no keywords to analyze")]
    EmptyInput,

    /// The parsed keyword batch exceeds the configured limit.
    #[error("too many keywords: {count} (limit {limit})")]
    TooManyKeywords { count: usize, limit: usize },

    /// The external classifier failed (spawn, exit status, or response parsing).
    #[error("classification failed: {0}")]
    Classification(String),

    /// Unknown filter, sort key, direction, or a malformed request field.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite result store error.
    #[cfg(feature = "cache")]
    #[error("storage error: {0}")]
    Storage(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SiteplanError>;

impl SiteplanError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
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

    /// True for errors raised before the classifier is ever invoked.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::TooManyKeywords { .. })
    }
}
