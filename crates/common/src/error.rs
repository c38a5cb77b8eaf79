//! Error types shared across Attentrack crates.
//!
//! The estimation core itself has no fatal conditions; these errors only
//! surface at the edges (frame construction, config validation, parsing).

use std::path::PathBuf;

/// Top-level error type for Attentrack operations.
#[derive(Debug, thiserror::Error)]
pub enum AttentrackError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Frame error: {message}")]
    Frame { message: String },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using AttentrackError.
pub type AttentrackResult<T> = Result<T, AttentrackError>;

impl AttentrackError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame {
            message: msg.into(),
        }
    }

    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }
}
