//! Route table.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use okary_storage::media::MAX_IMAGE_BYTES;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::extract::authenticate;
use crate::graphql::{graphql_http, graphql_ws};
use crate::images::{download_image, upload_image};
use crate::login::login;
use crate::AppState;

/// Default GraphQL endpoint path.
pub const DEFAULT_GRAPHQL_PATH: &str = "/graphql";

/// Request body cap; leaves room for multipart framing around a full-size image.
const BODY_LIMIT: usize = MAX_IMAGE_BYTES + 64 * 1024;

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Builds the application router.
///
/// `graphql_path` serves GraphQL over HTTP on `POST` and the WebSocket
/// transport on `GET`.
pub fn router(state: AppState, graphql_path: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route(graphql_path, get(graphql_ws).post(graphql_http))
        .route("/images/{kind}", post(upload_image))
        .route("/images/{kind}/{filename}", get(download_image))
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(BODY_LIMIT)),
        )
        .with_state(state)
}
