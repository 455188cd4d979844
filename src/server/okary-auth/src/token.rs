//! Bearer token codec.
//!
//! Tokens are HS256 JWTs carrying the principal's id, email, username and
//! role. The signing secret and lifetime are injected through
//! [`TokenConfig`]; the codec holds no other state.

use std::fmt;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, get_current_timestamp, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use okary_storage::Role;

use crate::{AuthError, Principal};

/// Token lifetime used when none is configured explicitly (dev mode).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Signing configuration for [`TokenCodec`].
pub struct TokenConfig {
    secret: Zeroizing<Vec<u8>>,
    ttl: Duration,
}

impl TokenConfig {
    /// Creates a configuration from raw secret bytes and a lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the secret is empty or the
    /// lifetime is shorter than one second.
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Result<Self, AuthError> {
        let secret = Zeroizing::new(secret.into());

        if secret.is_empty() {
            return Err(AuthError::Configuration("token secret cannot be empty".into()));
        }

        if ttl.as_secs() == 0 {
            return Err(AuthError::Configuration(
                "token ttl must be at least one second".into(),
            ));
        }

        Ok(Self { secret, ttl })
    }

    /// Creates a configuration from a base64-encoded secret.
    pub fn from_base64(encoded: &str, ttl: Duration) -> Result<Self, AuthError> {
        let secret = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AuthError::Configuration(format!("secret is not valid base64: {e}")))?;
        Self::new(secret, ttl)
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject (user id).
    sub: String,
    email: String,
    username: String,
    role: Role,
    /// Issued at (Unix timestamp).
    iat: u64,
    /// Expiration (Unix timestamp).
    exp: u64,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Issued at (Unix seconds).
    pub issued_at: u64,
    /// Expiration (Unix seconds).
    pub expires_at: u64,
}

/// Signs principals into bearer tokens and verifies them back.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenCodec {
    /// Creates a codec for the given configuration.
    pub fn new(config: &TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&config.secret);
        let decoding_key = DecodingKey::from_secret(&config.secret);

        // Only HS256 is accepted; a token naming any other algorithm fails.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            ttl_secs: config.ttl.as_secs(),
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Signs a token for `principal`, issued now.
    pub fn sign(&self, principal: &Principal) -> Result<IssuedToken, AuthError> {
        self.sign_at(principal, get_current_timestamp())
    }

    /// Signs a token for `principal` with an explicit issuance time.
    pub fn sign_at(&self, principal: &Principal, issued_at: u64) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at.saturating_add(self.ttl_secs);

        let claims = Claims {
            sub: principal.id.to_string(),
            email: principal.email.clone(),
            username: principal.username.clone(),
            role: principal.role,
            iat: issued_at,
            exp: expires_at,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Configuration(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verifies a token, reporting why it was rejected.
    pub fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            },
        )?;

        let claims = token_data.claims;

        // The library accepts `exp == now`; a token is only valid strictly before expiry.
        if claims.exp <= get_current_timestamp() {
            return Err(AuthError::TokenExpired);
        }

        let id = claims.sub.parse::<i64>().map_err(|_| AuthError::TokenInvalid)?;

        Ok(Principal {
            id,
            username: claims.username,
            email: claims.email,
            role: claims.role,
        })
    }

    /// Decodes a token into a principal.
    ///
    /// Never fails: any parse, signature, algorithm, claim or expiry problem
    /// yields `None`, which callers treat as anonymous.
    pub fn decode(&self, token: &str) -> Option<Principal> {
        match self.verify(token) {
            Ok(principal) => Some(principal),
            Err(e) => {
                debug!(error = %e, "Rejected bearer token");
                None
            },
        }
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
