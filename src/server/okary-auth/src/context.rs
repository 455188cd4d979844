//! Per-request and per-connection execution context.
//!
//! Both transports produce the same [`ExecutionContext`]:
//!
//! - HTTP: [`authenticate_bearer`] runs on the `Authorization` header before
//!   the GraphQL handler, and [`ExecutionContext::from_request`] lifts the
//!   attached principal.
//! - WebSocket: [`ExecutionContext::from_connection_init`] runs once on the
//!   `connection_init` payload and the result is reused for every operation
//!   on that connection.
//!
//! Neither path fails: a missing or invalid token yields an anonymous context.

use serde_json::Value;

use crate::{Principal, TokenCodec};

/// Field of the WebSocket `connection_init` payload carrying the token.
pub const CONNECTION_TOKEN_FIELD: &str = "accessToken";

/// Context shared read-only by every resolver of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    principal: Option<Principal>,
}

impl ExecutionContext {
    /// A context with no principal.
    pub const fn anonymous() -> Self {
        Self { principal: None }
    }

    /// A context for an authenticated principal.
    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    /// Lifts the principal attached by the HTTP authentication step.
    pub fn from_request(attached: Option<Principal>) -> Self {
        Self {
            principal: attached,
        }
    }

    /// Builds the context of a WebSocket connection from its init payload.
    pub fn from_connection_init(codec: &TokenCodec, payload: &Value) -> Self {
        let principal = payload
            .get(CONNECTION_TOKEN_FIELD)
            .and_then(Value::as_str)
            .and_then(|token| codec.decode(token));

        Self { principal }
    }

    /// The authenticated principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns true if a principal is present.
    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` value.
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Decodes the principal from an optional `Authorization` header value.
pub fn authenticate_bearer(codec: &TokenCodec, authorization: Option<&str>) -> Option<Principal> {
    authorization
        .and_then(bearer_token)
        .and_then(|token| codec.decode(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TokenConfig, DEFAULT_TOKEN_TTL};
    use jsonwebtoken::get_current_timestamp;
    use okary_storage::Role;
    use serde_json::json;

    fn codec() -> TokenCodec {
        TokenCodec::new(
            &TokenConfig::new("context-test-secret", DEFAULT_TOKEN_TTL).expect("valid config"),
        )
    }

    fn admin() -> Principal {
        Principal {
            id: 1,
            username: "root".to_string(),
            email: "root@okary.dev".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer  abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER abc "), Some("abc"));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }

    #[test]
    fn test_http_context_from_valid_header() {
        let codec = codec();
        let token = codec.sign(&admin()).unwrap().token;
        let header = format!("Bearer {token}");

        let ctx = ExecutionContext::from_request(authenticate_bearer(&codec, Some(&header)));
        assert_eq!(ctx.principal(), Some(&admin()));
    }

    #[test]
    fn test_http_context_is_anonymous_on_bad_header() {
        let codec = codec();
        for header in [None, Some("Bearer typo"), Some("Token abc"), Some("")] {
            let ctx = ExecutionContext::from_request(authenticate_bearer(&codec, header));
            assert!(!ctx.is_authenticated(), "header {header:?}");
        }
    }

    #[test]
    fn test_ws_context_with_token() {
        let codec = codec();
        let token = codec.sign(&admin()).unwrap().token;

        let ctx = ExecutionContext::from_connection_init(&codec, &json!({ "accessToken": token }));
        assert_eq!(ctx.principal(), Some(&admin()));
    }

    #[test]
    fn test_ws_context_with_expired_token() {
        let codec = codec();
        let stale = get_current_timestamp() - codec.ttl().as_secs() - 60;
        let token = codec.sign_at(&admin(), stale).unwrap().token;

        let ctx = ExecutionContext::from_connection_init(&codec, &json!({ "accessToken": token }));
        assert_eq!(ctx, ExecutionContext::anonymous());
    }

    #[test]
    fn test_ws_context_without_token() {
        let codec = codec();
        for payload in [
            json!(null),
            json!({}),
            json!({ "accessToken": null }),
            json!({ "accessToken": 12 }),
            json!({ "token": "x" }),
        ] {
            let ctx = ExecutionContext::from_connection_init(&codec, &payload);
            assert!(!ctx.is_authenticated(), "payload {payload}");
        }
    }

    #[test]
    fn test_transports_produce_same_context() {
        let codec = codec();
        let token = codec.sign(&admin()).unwrap().token;

        let http = ExecutionContext::from_request(authenticate_bearer(
            &codec,
            Some(&format!("Bearer {token}")),
        ));
        let ws = ExecutionContext::from_connection_init(&codec, &json!({ "accessToken": token }));
        assert_eq!(http, ws);
    }
}
