//! GraphQL transports.
//!
//! Both handlers build an [`ExecutionContext`] before any resolver runs:
//! per request over HTTP, once per connection over WebSocket.

use std::sync::Arc;

use async_graphql::http::ALL_WEBSOCKET_PROTOCOLS;
use async_graphql::Data;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use okary_auth::{ExecutionContext, TokenCodec};
use tracing::debug;

use crate::extract::RequestPrincipal;
use crate::AppState;

/// Executes a GraphQL request received over HTTP.
pub async fn graphql_http(
    State(state): State<AppState>,
    RequestPrincipal(principal): RequestPrincipal,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let ctx = ExecutionContext::from_request(principal);
    state.schema.execute(request.into_inner().data(ctx)).await.into()
}

/// Upgrades to a GraphQL WebSocket connection.
pub async fn graphql_ws(
    State(state): State<AppState>,
    protocol: GraphQLProtocol,
    upgrade: WebSocketUpgrade,
) -> Response {
    let schema = state.schema.clone();
    let codec = state.codec.clone();

    upgrade
        .protocols(ALL_WEBSOCKET_PROTOCOLS)
        .on_upgrade(move |stream| {
            GraphQLWebSocket::new(stream, schema, protocol)
                .on_connection_init(move |payload| connection_init(codec, payload))
                .serve()
        })
}

/// Builds the connection data from the `connection_init` payload.
///
/// Never refuses the connection; an absent or invalid token yields an
/// anonymous context.
pub async fn connection_init(
    codec: Arc<TokenCodec>,
    payload: serde_json::Value,
) -> async_graphql::Result<Data> {
    let ctx = ExecutionContext::from_connection_init(&codec, &payload);
    debug!(authenticated = ctx.is_authenticated(), "WebSocket connection initialised");

    let mut data = Data::default();
    data.insert(ctx);
    Ok(data)
}
