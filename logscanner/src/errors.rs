//! Error types for the scan pipeline.
//!
//! Errors fall into two groups. Job-level errors (`FileNotFound`,
//! `PermissionDenied`, `Parse`, `Extract`) are caught by the worker pool and
//! rendered into a failed outcome for that one document. Run-level errors
//! (`InvalidInput`, `Persistence`, `Config`, `WorkerPool`) end the run and
//! are returned to the caller.
//!
//! ```rust,ignore
//! match controller.run() {
//!     Ok(summary) => println!("{} matches", summary.matched),
//!     Err(ScanError::InvalidInput(msg)) => eprintln!("bad input: {msg}"),
//!     Err(ScanError::Persistence { path, .. }) => eprintln!("could not write {}", path.display()),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while scanning a folder
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("Unable to parse document: {0}")]
    Parse(String),
    #[error("Unable to extract text: {0}")]
    Extract(String),
    #[error("Failed to write results to {path}: {source}")]
    Persistence {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn extract(msg: impl Into<String>) -> Self {
        Self::Extract(msg.into())
    }

    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Maps an I/O error raised while opening `path` to the matching variant.
    pub fn from_open(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::Io(err),
        }
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
