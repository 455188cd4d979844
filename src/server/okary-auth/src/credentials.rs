//! Credential verification.

use std::fmt;
use std::sync::Arc;

use okary_storage::UserStore;
use serde::Deserialize;
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::password::{hash_password, verify_password};
use crate::{AuthError, Principal};

/// Login input. Wiped from memory on drop.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    /// Login identifier (the account email).
    #[serde(default, alias = "email")]
    pub identifier: String,
    /// Plain password.
    #[serde(default, alias = "password")]
    pub secret: String,
}

impl Credentials {
    /// Create credentials from an identifier and a secret.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Checks credentials against stored users.
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    dummy_hash: String,
}

impl CredentialVerifier {
    /// Create a verifier over a user store.
    ///
    /// Hashes a throwaway password once so that unknown identifiers still
    /// pay for one argon2 verification.
    pub fn new(users: Arc<dyn UserStore>) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("okary-unknown-user")?;
        Ok(Self { users, dummy_hash })
    }

    /// Verify credentials and return the matching principal.
    ///
    /// # Errors
    ///
    /// * `InvalidCredentials` - empty input, unknown identifier or wrong secret
    /// * `Storage` - the user lookup failed
    pub async fn verify(&self, credentials: &Credentials) -> Result<Principal, AuthError> {
        let identifier = credentials.identifier.trim();
        if identifier.is_empty() || credentials.secret.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self.users.find_user_by_email(identifier).await?;

        let Some(user) = user else {
            let _ = verify_password(&credentials.secret, &self.dummy_hash);
            debug!("Login for unknown identifier");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&credentials.secret, &user.password_hash) {
            warn!(user_id = user.id, "Login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Principal::from(&user))
    }
}
