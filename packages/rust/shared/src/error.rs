//! Error types for DeepBrief.
//!
//! Library crates use [`DeepBriefError`] via `thiserror`. Per-stage
//! failures inside a pipeline run are recorded against the stage and do
//! not surface here; only unrecoverable failures reach the caller.

use std::path::PathBuf;

/// Top-level error type for all DeepBrief operations.
#[derive(Debug, thiserror::Error)]
pub enum DeepBriefError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during fetch.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing or content extraction error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// A capability (refiner, searcher, summarizer) failed.
    #[error("capability error: {0}")]
    Capability(String),

    /// A pipeline run failed with no recovery path, naming the stage
    /// where the failure originated.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (invalid input, bad graph structure, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DeepBriefError>;

impl DeepBriefError {
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

    /// Create a stage failure naming the originating stage.
    pub fn stage(stage: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
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
