//! Integration tests for the Okary server.
//!
//! These tests spawn the server binary and drive it over HTTP and WebSocket.

// Allow unwrap() in tests - panics are acceptable for test assertions
#![allow(clippy::disallowed_methods)]

use std::process::{Child, Command, Stdio};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;

/// Token secret the test servers are started with.
pub const TEST_SECRET: &str = "integration-test-secret";
pub const ADMIN_EMAIL: &str = "root@okary.dev";
pub const ADMIN_PASSWORD: &str = "s3cret";

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub identifier: &'a str,
    pub secret: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: u64,
    pub principal: PrincipalResponse,
}

#[derive(Debug, Deserialize)]
pub struct PrincipalResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
}

// ============================================================================
// Test Server
// ============================================================================

/// A test server instance that manages its own data directory and process.
pub struct TestServer {
    process: Child,
    pub base_url: String,
    pub port: u16,
    _data_dir: TempDir,
}

impl TestServer {
    /// Start a new dev-mode server with a fixed secret and a bootstrap admin.
    pub async fn start(port: u16) -> Result<Self> {
        let data_dir = TempDir::new().context("Failed to create temp dir")?;

        let server_binary = find_server_binary()?;

        let process = Command::new(&server_binary)
            .arg("--dev")
            .arg("--jwt-secret")
            .arg(TEST_SECRET)
            .arg("--data-dir")
            .arg(data_dir.path())
            .arg("--bind")
            .arg(format!("127.0.0.1:{}", port))
            .arg("--admin-email")
            .arg(ADMIN_EMAIL)
            .arg("--admin-password")
            .arg(ADMIN_PASSWORD)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start server: {:?}", server_binary))?;

        let server = Self {
            process,
            base_url: format!("http://127.0.0.1:{}", port),
            port,
            _data_dir: data_dir,
        };

        server.wait_for_ready().await?;

        Ok(server)
    }

    /// Wait for the server to be ready to accept connections.
    async fn wait_for_ready(&self) -> Result<()> {
        let client = Client::new();
        let url = format!("{}/health", self.base_url);

        for _ in 0..100 {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(Duration::from_millis(100)).await,
            }
        }

        bail!("Server failed to start within 10 seconds")
    }

    /// Get a configured HTTP client for this server.
    pub fn client(&self) -> OkaryClient {
        OkaryClient::new(&self.base_url)
    }

    /// WebSocket URL of the GraphQL endpoint.
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}/graphql", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}

/// Find the server binary in the target directory.
fn find_server_binary() -> Result<std::path::PathBuf> {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());

    let candidates = [
        std::path::Path::new(&manifest_dir).join("../../target/debug/okary-server"),
        std::path::Path::new(&manifest_dir).join("../../target/debug/okary-server.exe"),
        std::path::Path::new(&manifest_dir).join("../../target/release/okary-server"),
        std::path::Path::new(&manifest_dir).join("../../target/release/okary-server.exe"),
    ];

    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.canonicalize()?);
        }
    }

    bail!(
        "Could not find okary-server binary. Run 'cargo build -p okary-server' first. Searched in: {:?}",
        candidates
    )
}

// ============================================================================
// Test Client
// ============================================================================

/// HTTP client for testing the Okary API.
pub struct OkaryClient {
    client: Client,
    base_url: String,
    authorization: Option<String>,
}

impl OkaryClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            authorization: None,
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.authorization = Some(format!("Bearer {token}"));
        self
    }

    /// Sends a raw `Authorization` header value.
    pub fn with_authorization(mut self, value: &str) -> Self {
        self.authorization = Some(value.to_string());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        let resp = self.client.get(self.url("/health")).send().await?;
        Ok(resp.json().await?)
    }

    /// Logs in; returns the status and, on success, the parsed body.
    pub async fn login(&self, email: &str, password: &str) -> Result<(StatusCode, Option<LoginResponse>)> {
        let resp = self
            .client
            .post(self.url("/login"))
            .json(&LoginRequest {
                identifier: email,
                secret: password,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            if !body.is_empty() {
                bail!("Unexpected login error body: {body}");
            }
            return Ok((status, None));
        }

        Ok((status, Some(resp.json().await?)))
    }

    pub async fn graphql(&self, query: &str, variables: Value) -> Result<Value> {
        let mut req = self
            .client
            .post(self.url("/graphql"))
            .json(&json!({ "query": query, "variables": variables }));
        if let Some(value) = &self.authorization {
            req = req.header(reqwest::header::AUTHORIZATION, value);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            bail!("GraphQL request failed: {}", resp.status());
        }
        Ok(resp.json().await?)
    }
}

/// Opens a `graphql-transport-ws` connection, sends `connection_init` with
/// `payload` and runs one operation, returning its first result payload.
pub async fn ws_execute(url: &str, payload: Value, query: &str) -> Result<Value> {
    let mut request = url.into_client_request()?;
    request.headers_mut().insert(
        "Sec-WebSocket-Protocol",
        HeaderValue::from_static("graphql-transport-ws"),
    );

    let (mut socket, _) = tokio_tungstenite::connect_async(request)
        .await
        .context("WebSocket connect failed")?;

    let init = json!({ "type": "connection_init", "payload": payload });
    socket.send(Message::Text(init.to_string())).await?;

    let subscribe = json!({ "id": "1", "type": "subscribe", "payload": { "query": query } });
    let mut subscribed = false;

    while let Some(message) = tokio::time::timeout(Duration::from_secs(10), socket.next())
        .await
        .context("Timed out waiting for WebSocket message")?
    {
        let Message::Text(text) = message? else {
            continue;
        };
        let frame: Value = serde_json::from_str(&text)?;

        match frame["type"].as_str() {
            Some("connection_ack") if !subscribed => {
                socket.send(Message::Text(subscribe.to_string())).await?;
                subscribed = true;
            },
            Some("next") => {
                let _ = socket.close(None).await;
                return Ok(frame["payload"].clone());
            },
            Some("error") => bail!("Operation rejected: {}", frame["payload"]),
            Some("ping") => {
                socket
                    .send(Message::Text(json!({ "type": "pong" }).to_string()))
                    .await?;
            },
            _ => {},
        }
    }

    bail!("WebSocket closed before a result arrived")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use okary_auth::{Principal, TokenCodec, TokenConfig, DEFAULT_TOKEN_TTL};
    use okary_storage::Role;
    use std::sync::atomic::{AtomicU16, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    // Port counter to avoid conflicts between parallel tests
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(19100);

    fn next_port() -> u16 {
        PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
    }

    fn test_codec() -> TokenCodec {
        TokenCodec::new(&TokenConfig::new(TEST_SECRET, DEFAULT_TOKEN_TTL).unwrap())
    }

    fn code(response: &Value) -> Option<&str> {
        response["errors"][0]["extensions"]["code"].as_str()
    }

    async fn admin_token(server: &TestServer) -> String {
        let (_, body) = server
            .client()
            .login(ADMIN_EMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();
        body.unwrap().token
    }

    const CREATE_SONG: &str =
        r#"mutation { createSong(input: { title: "Blue", artist: "Joni" }) { id title } }"#;

    #[tokio::test]
    async fn test_server_health_in_dev_mode() {
        let server = TestServer::start(next_port()).await.unwrap();

        let health = server.client().health().await.unwrap();

        assert_eq!(health.status, "ok");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_login() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client();

        let (status, body) = client.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let body = body.unwrap();
        assert_eq!(body.principal.email, ADMIN_EMAIL);
        assert_eq!(body.principal.role, "admin");
        assert!(!body.principal.username.is_empty());
        assert!(body.principal.id > 0);

        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        assert!(body.expires_at > now);

        let (status, body) = client.login(ADMIN_EMAIL, "wrong").await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.is_none());

        let (status, _) = client.login("nobody@okary.dev", ADMIN_PASSWORD).await.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_mutation_and_member_rejection() {
        let server = TestServer::start(next_port()).await.unwrap();
        let admin = server.client().with_token(&admin_token(&server).await);

        let res = admin.graphql(CREATE_SONG, json!({})).await.unwrap();
        assert_eq!(res["data"]["createSong"]["title"], "Blue");

        let signup = r#"mutation { createUser(input: { username: "ana", email: "ana@okary.dev", password: "pw" }) { role } }"#;
        let res = server.client().graphql(signup, json!({})).await.unwrap();
        assert_eq!(res["data"]["createUser"]["role"], "user");

        let (_, body) = server.client().login("ana@okary.dev", "pw").await.unwrap();
        let member = server.client().with_token(&body.unwrap().token);

        let res = member.graphql(CREATE_SONG, json!({})).await.unwrap();
        assert_eq!(code(&res), Some("UNAUTHORIZED"));

        let res = server.client().graphql("{ songs { title } }", json!({})).await.unwrap();
        assert_eq!(res["data"]["songs"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_bearer_is_anonymous() {
        let server = TestServer::start(next_port()).await.unwrap();
        let client = server.client().with_authorization("Bearer typo");

        let res = client.graphql("{ songs { title } me { id } }", json!({})).await.unwrap();
        assert!(res["errors"].is_null());
        assert_eq!(res["data"]["me"], Value::Null);

        let res = client.graphql(CREATE_SONG, json!({})).await.unwrap();
        assert_eq!(code(&res), Some("UNAUTHORIZED"));
    }

    #[tokio::test]
    async fn test_websocket_with_valid_token() {
        let server = TestServer::start(next_port()).await.unwrap();
        let token = admin_token(&server).await;

        let payload = ws_execute(&server.ws_url(), json!({ "accessToken": token }), CREATE_SONG)
            .await
            .unwrap();
        assert_eq!(payload["data"]["createSong"]["title"], "Blue");

        let payload = ws_execute(&server.ws_url(), json!({ "accessToken": token }), "{ me { role } }")
            .await
            .unwrap();
        assert_eq!(payload["data"]["me"]["role"], "admin");
    }

    #[tokio::test]
    async fn test_websocket_with_expired_token() {
        let server = TestServer::start(next_port()).await.unwrap();
        let (_, body) = server.client().login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
        let admin = body.unwrap().principal;

        let principal = Principal {
            id: admin.id,
            username: admin.username,
            email: admin.email,
            role: Role::Admin,
        };
        let codec = test_codec();
        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let expired = codec
            .sign_at(&principal, now - DEFAULT_TOKEN_TTL.as_secs() - 60)
            .unwrap()
            .token;

        let payload = ws_execute(&server.ws_url(), json!({ "accessToken": expired }), CREATE_SONG)
            .await
            .unwrap();
        assert_eq!(code(&payload), Some("UNAUTHORIZED"));

        let payload = ws_execute(&server.ws_url(), json!({ "accessToken": expired }), "{ me { id } }")
            .await
            .unwrap();
        assert_eq!(payload["data"]["me"], Value::Null);
    }

    #[tokio::test]
    async fn test_websocket_without_payload_is_anonymous() {
        let server = TestServer::start(next_port()).await.unwrap();

        let payload = ws_execute(&server.ws_url(), json!({}), "{ songs { title } }")
            .await
            .unwrap();
        assert_eq!(payload["data"]["songs"], json!([]));
    }
}
