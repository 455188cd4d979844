//! Authentication error types.

use std::fmt;

use okary_storage::StorageError;
use thiserror::Error;

/// Why the guard refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    /// The context carries no principal.
    NoCredential,
    /// The principal's role is not in the allowlist.
    InsufficientRole,
}

impl fmt::Display for UnauthorizedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnauthorizedReason::NoCredential => f.write_str("no credential"),
            UnauthorizedReason::InsufficientRole => f.write_str("insufficient role"),
        }
    }
}

/// Errors that can occur during authentication and authorization.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown identifier or wrong secret. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Token is malformed, signed with another key or algorithm, or carries bad claims.
    #[error("invalid token")]
    TokenInvalid,

    /// Token signature is valid but its expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// The guard rejected the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Invalid codec configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// User lookup failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
