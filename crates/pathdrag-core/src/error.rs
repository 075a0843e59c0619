//! Error types for the drag engine.
//!
//! Nothing in the engine is fatal. Internal helpers return these errors and
//! the public event handlers log them and carry on as a no-op.

use thiserror::Error;

/// Drag engine errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DragError {
    #[error("no active drag session")]
    NoActiveSession,
    #[error("transform matrix must have 6 elements, got {0}")]
    MalformedMatrix(usize),
    #[error("no shape supplied")]
    MissingShape,
    #[error("host version {found} is older than {required}")]
    UnsupportedHostVersion { found: String, required: String },
    #[error("invalid version string: {0:?}")]
    InvalidVersion(String),
}

/// Result type for drag engine operations.
pub type DragResult<T> = Result<T, DragError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse drag options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
