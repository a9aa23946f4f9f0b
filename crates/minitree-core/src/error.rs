//! Error types for minitree

use std::path::PathBuf;
use thiserror::Error;

/// minitree error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to run {tool}. {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("Failed to run the command:\n{command}\n(exit status: {status})\n{stderr}")]
    PreprocessFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Unreconcilable line: no original line from line {line} on matches {stripped:?}")]
    UnreconcilableLine { line: usize, stripped: String },

    #[error("No #include line for header {header:?} found in the original source")]
    IncludeNotFound { header: PathBuf },

    #[error("{0}")]
    InvalidInvocation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for minitree
pub type Result<T> = std::result::Result<T, Error>;
