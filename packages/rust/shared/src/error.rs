//! Error types for wikimd.
//!
//! Library crates use [`WikiMdError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all wikimd operations.
#[derive(Debug, thiserror::Error)]
pub enum WikiMdError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the encyclopedia or fetching images.
    #[error("network error: {0}")]
    Network(String),

    /// API response or extract parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (empty topic, no languages, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The topic matched a disambiguation page; no single article can be chosen.
    #[error("\"{topic}\" is ambiguous ({} candidates)", options.len())]
    Disambiguation { topic: String, options: Vec<String> },

    /// The topic does not exist in any of the requested languages.
    #[error("page not found for the topic: {topic} (languages: {})", languages.join(","))]
    NotFound {
        topic: String,
        languages: Vec<String>,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WikiMdError>;

impl WikiMdError {
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
