//! Error types for ProfileScout.
//!
//! Library crates use [`ScoutError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! A single failed scoring call is deliberately NOT represented here: it is
//! the `Failed` arm of [`crate::types::ScoreOutcome`] and never aborts a run.

use std::path::PathBuf;

/// Top-level error type for all ProfileScout operations.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed or empty source table: nothing to screen.
    /// Raised before any external call is made.
    #[error("input error: {message}")]
    Input { message: String },

    /// Enrichment service failure (non-success status, unparsable body,
    /// timeout, or per-chunk count mismatch). Fatal for the whole run.
    #[error("enrichment error: {0}")]
    Upstream(String),

    /// Report serialization or delivery failure. Raised only after
    /// scoring has fully completed.
    #[error("output error: {0}")]
    Output(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScoutError>;

impl ScoutError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an input error from any displayable message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
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
