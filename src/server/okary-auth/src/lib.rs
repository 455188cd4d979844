//! # Okary Auth
//!
//! Authentication and authorization for Okary.
//!
//! ## Pipeline
//!
//! - [`CredentialVerifier`] checks login credentials against stored users
//! - [`TokenCodec`] issues and verifies HS256 bearer tokens
//! - [`ExecutionContext`] carries the principal of one request or connection
//! - [`guard`] checks the principal's role before a resolver touches state

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod password;
pub mod principal;
pub mod token;

pub use context::{authenticate_bearer, bearer_token, ExecutionContext, CONNECTION_TOKEN_FIELD};
pub use credentials::{CredentialVerifier, Credentials};
pub use error::{AuthError, UnauthorizedReason};
pub use password::{hash_password, verify_password};
pub use principal::Principal;
pub use token::{IssuedToken, TokenCodec, TokenConfig, DEFAULT_TOKEN_TTL};
