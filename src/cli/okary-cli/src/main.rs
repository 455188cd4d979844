//! Okary CLI - Command line interface.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use okary_auth::hash_password;
use okary_storage::model::NewUser;
use okary_storage::{Role, UserStore};
use okary_storage_sqlite::SqliteBackend;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "okary")]
#[command(about = "Okary CLI - Query the music catalog and manage the local database")]
#[command(version)]
struct Cli {
    /// Okary server address
    #[arg(long, default_value = "http://localhost:9001", env = "OKARY_ADDR")]
    addr: String,

    /// Bearer token
    #[arg(long, env = "OKARY_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Data directory of the local database
    #[arg(long, default_value = "data", env = "OKARY_DATA_DIR")]
    data_dir: PathBuf,

    /// Local database name
    #[arg(long, default_value = "okary", env = "OKARY_DATABASE")]
    database: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status,
    /// Log in and print a bearer token
    Login {
        /// Account email
        email: String,
        /// Password (read from stdin if not provided)
        #[arg(long)]
        password: Option<String>,
    },
    /// Run a GraphQL operation
    Query {
        /// GraphQL document
        query: String,
        /// Variables as a JSON object
        #[arg(long)]
        variables: Option<String>,
        /// GraphQL endpoint path
        #[arg(long, default_value = "/graphql", env = "OKARY_GRAPHQL_PATH")]
        graphql_path: String,
    },
    /// Local database commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Local account commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Drop and recreate every table
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create an account
    Add {
        username: String,
        email: String,
        /// Password (read from stdin if not provided)
        #[arg(long)]
        password: Option<String>,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    version: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    identifier: &'a str,
    secret: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    expires_at: u64,
    principal: PrincipalResponse,
}

#[derive(Debug, Deserialize)]
struct PrincipalResponse {
    username: String,
    role: String,
}

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

// ============================================================================
// HTTP Client
// ============================================================================

struct OkaryClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl OkaryClient {
    fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn error_message(resp: Response) -> String {
        let status = resp.status();
        match resp.json::<ErrorResponse>().await {
            Ok(error) => error.error,
            Err(_) => status.to_string(),
        }
    }

    async fn get_health(&self) -> Result<HealthResponse> {
        let resp = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .context("Failed to connect to server")?;

        if !resp.status().is_success() {
            bail!("Server error: {}", Self::error_message(resp).await);
        }

        resp.json().await.context("Failed to parse response")
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let resp = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest {
                identifier: email,
                secret: password,
            })
            .send()
            .await
            .context("Failed to connect to server")?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            bail!("Login failed: invalid credentials");
        }
        if !resp.status().is_success() {
            bail!("Login failed: {}", Self::error_message(resp).await);
        }

        resp.json().await.context("Failed to parse response")
    }

    async fn graphql(&self, path: &str, query: &str, variables: Option<Value>) -> Result<Value> {
        let mut req = self
            .client
            .post(self.url(path))
            .json(&GraphQLRequest { query, variables });

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.context("Failed to connect to server")?;

        if !resp.status().is_success() {
            bail!("Query failed: {}", Self::error_message(resp).await);
        }

        resp.json().await.context("Failed to parse response")
    }
}

// ============================================================================
// Command Handlers
// ============================================================================

fn read_secret(prompt: &str, given: Option<String>) -> Result<String> {
    let secret = match given {
        Some(s) => s,
        None => {
            print!("{prompt}");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        },
    };

    if secret.is_empty() {
        bail!("Password cannot be empty");
    }

    Ok(secret)
}

async fn cmd_status(client: &OkaryClient) -> Result<()> {
    let health = client.get_health().await?;

    println!("Okary server status:");
    println!("  Status:  {}", health.status);
    println!("  Version: {}", health.version);

    Ok(())
}

async fn cmd_login(client: &OkaryClient, email: &str, password: Option<String>) -> Result<()> {
    let password = read_secret("Password: ", password)?;
    let result = client.login(email, &password).await?;

    eprintln!(
        "Logged in as {} ({}), token expires at {}",
        result.principal.username, result.principal.role, result.expires_at
    );
    println!("{}", result.token);

    Ok(())
}

async fn cmd_query(
    client: &OkaryClient,
    path: &str,
    query: &str,
    variables: Option<&str>,
) -> Result<()> {
    let variables = variables
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("Variables must be a JSON object")?;

    if let Some(vars) = &variables {
        if !vars.is_object() {
            bail!("Variables must be a JSON object");
        }
    }

    let result = client.graphql(path, query, variables).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.get("errors").is_some_and(|e| !e.is_null()) {
        bail!("Query returned errors");
    }

    Ok(())
}

async fn cmd_db_reset(backend: &SqliteBackend, yes: bool) -> Result<()> {
    if !yes {
        print!(
            "This deletes every record in {}. Continue? [y/N] ",
            backend.path().display()
        );
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if !matches!(line.trim(), "y" | "Y" | "yes") {
            println!("Aborted");
            return Ok(());
        }
    }

    backend.reset().await?;
    println!("Database reset");

    Ok(())
}

async fn cmd_user_add(
    backend: &SqliteBackend,
    username: String,
    email: String,
    password: Option<String>,
    admin: bool,
) -> Result<()> {
    let password = read_secret("Password: ", password)?;
    let role = if admin { Role::Admin } else { Role::User };

    let user = backend
        .create_user(NewUser {
            username,
            email,
            password_hash: hash_password(&password)?,
            role,
        })
        .await?;

    println!("User {} created (id {}, role {})", user.username, user.id, user.role);

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status => cmd_status(&OkaryClient::new(&cli.addr, cli.token)?).await,
        Commands::Login { email, password } => {
            cmd_login(&OkaryClient::new(&cli.addr, None)?, &email, password).await
        },
        Commands::Query {
            query,
            variables,
            graphql_path,
        } => {
            let client = OkaryClient::new(&cli.addr, cli.token)?;
            cmd_query(&client, &graphql_path, &query, variables.as_deref()).await
        },
        Commands::Db { command } => {
            let backend = SqliteBackend::open(&cli.data_dir, &cli.database).await?;
            match command {
                DbCommands::Reset { yes } => cmd_db_reset(&backend, yes).await,
            }
        },
        Commands::User { command } => {
            let backend = SqliteBackend::open(&cli.data_dir, &cli.database).await?;
            match command {
                UserCommands::Add {
                    username,
                    email,
                    password,
                    admin,
                } => cmd_user_add(&backend, username, email, password, admin).await,
            }
        },
    }
}
