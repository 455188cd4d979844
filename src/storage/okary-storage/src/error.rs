//! Storage error types.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Entry not found.
    #[error("entry not found: {0}")]
    NotFound(String),

    /// Entry already exists (unique constraint).
    #[error("entry already exists: {0}")]
    AlreadyExists(String),

    /// Input rejected before or by the backend (bad name, dangling reference).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Connection or migration failure.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failure.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Stored value could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Generic I/O error.
    #[error("io error: {0}")]
    Io(String),
}
