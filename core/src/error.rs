//! Error types and handling for imgdesk core

use thiserror::Error;

/// Result type alias for imgdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for imgdesk core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Search pattern errors
    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Errors raised while compiling or evaluating a search pattern.
///
/// None of these are fatal: a query whose pattern fails to compile degrades to
/// facet-only filtering, and a candidate that fails to match is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Invalid search pattern '{pattern}': {message}")]
    Invalid { pattern: String, message: String },

    #[error("Candidate of {len} bytes exceeds the match limit of {limit}")]
    CandidateTooLong { len: usize, limit: usize },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}
