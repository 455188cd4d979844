//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;
use okary_api::DEFAULT_GRAPHQL_PATH;
use okary_auth::{TokenConfig, DEFAULT_TOKEN_TTL};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::warn;

/// Paths served by the router itself; the GraphQL endpoint may not shadow them.
const RESERVED_PATHS: &[&str] = &["/login", "/health", "/images"];

#[derive(Parser, Debug)]
#[command(name = "okary-server")]
#[command(about = "Okary - music catalog GraphQL server")]
#[command(version)]
pub struct Cli {
    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:9001", env = "OKARY_BIND_ADDRESS")]
    pub bind: String,

    /// Directory holding the database and, by default, the images
    #[arg(long, default_value = "data", env = "OKARY_DATA_DIR")]
    pub data_dir: PathBuf,

    /// Database name (`{data-dir}/{name}.db`)
    #[arg(long, default_value = "okary", env = "OKARY_DATABASE")]
    pub database: String,

    /// Image directory [default: {data-dir}/images]
    #[arg(long, env = "OKARY_IMAGES_DIR")]
    pub images_dir: Option<PathBuf>,

    /// GraphQL endpoint path
    #[arg(long, default_value = DEFAULT_GRAPHQL_PATH, env = "OKARY_GRAPHQL_PATH")]
    pub graphql_path: String,

    /// Token signing secret
    #[arg(
        long,
        env = "OKARY_JWT_SECRET",
        hide_env_values = true,
        conflicts_with = "jwt_secret_base64"
    )]
    pub jwt_secret: Option<String>,

    /// Token signing secret, base64 encoded
    #[arg(long, env = "OKARY_JWT_SECRET_BASE64", hide_env_values = true)]
    pub jwt_secret_base64: Option<String>,

    /// Token lifetime in seconds
    #[arg(long, env = "OKARY_TOKEN_TTL")]
    pub token_ttl: Option<u64>,

    /// Enable development mode (generated secret, default token lifetime)
    #[arg(long, env = "OKARY_DEV_MODE")]
    pub dev: bool,

    /// Email of the admin account created at startup if missing
    #[arg(long, env = "OKARY_ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Username of the bootstrap admin account
    #[arg(long, default_value = "admin", env = "OKARY_ADMIN_USERNAME")]
    pub admin_username: String,

    /// Password of the bootstrap admin account
    #[arg(long, env = "OKARY_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

/// Account created at startup when no user holds its email.
pub struct AdminBootstrap<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

impl Cli {
    /// Checks settings that clap cannot express.
    pub fn validate(&self) -> Result<()> {
        let path = self.graphql_path.as_str();

        if !path.starts_with('/') || path.len() < 2 {
            bail!("--graphql-path must start with '/' and name a route: {path}");
        }

        if RESERVED_PATHS
            .iter()
            .any(|reserved| path == *reserved || path.starts_with(&format!("{reserved}/")))
        {
            bail!("--graphql-path conflicts with a built-in route: {path}");
        }

        Ok(())
    }

    /// Resolves the token signing configuration.
    ///
    /// Outside dev mode both the secret and the lifetime must be configured.
    pub fn token_config(&self) -> Result<TokenConfig> {
        let ttl = match (self.token_ttl, self.dev) {
            (Some(secs), _) => Duration::from_secs(secs),
            (None, true) => DEFAULT_TOKEN_TTL,
            (None, false) => bail!("--token-ttl is required outside dev mode"),
        };

        let config = match (&self.jwt_secret, &self.jwt_secret_base64) {
            (Some(secret), _) => TokenConfig::new(secret.as_bytes(), ttl)?,
            (None, Some(encoded)) => TokenConfig::from_base64(encoded, ttl)?,
            (None, None) if self.dev => {
                warn!("No token secret configured - using a random one, tokens will not survive a restart");
                let mut secret = vec![0u8; 32];
                OsRng.fill_bytes(&mut secret);
                TokenConfig::new(secret, ttl)?
            },
            (None, None) => bail!("--jwt-secret or --jwt-secret-base64 is required outside dev mode"),
        };

        Ok(config)
    }

    /// Image directory.
    pub fn images_root(&self) -> PathBuf {
        self.images_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("images"))
    }

    /// Bootstrap admin, if both email and password are set.
    pub fn admin_bootstrap(&self) -> Option<AdminBootstrap<'_>> {
        match (&self.admin_email, &self.admin_password) {
            (Some(email), Some(password)) => Some(AdminBootstrap {
                email,
                username: &self.admin_username,
                password,
            }),
            _ => None,
        }
    }
}
