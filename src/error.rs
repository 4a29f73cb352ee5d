//! Error types for chbench.
//!
//! Per-query failures are never errors: they are captured in the result
//! envelope and drive the exclusion policy. The variants here cover the
//! startup path (configuration, result sink) where failing fast is correct.

use thiserror::Error;

/// Result type for chbench operations.
pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Malformed or missing configuration. Fatal before any query executes.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Result directory or result file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Result record could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BenchError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        BenchError::Configuration(msg.into())
    }
}
