//! Bearer authentication for HTTP requests.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use okary_auth::{authenticate_bearer, Principal};

use crate::AppState;

/// Principal attached to a request by [`authenticate`], if any.
#[derive(Debug, Clone, Default)]
pub struct RequestPrincipal(pub Option<Principal>);

/// Decodes the bearer token and attaches the result to the request.
///
/// Never rejects: a missing or invalid token attaches `None`.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let principal = authenticate_bearer(&state.codec, authorization);
    request.extensions_mut().insert(RequestPrincipal(principal));

    next.run(request).await
}

impl<S> FromRequestParts<S> for RequestPrincipal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestPrincipal>()
            .cloned()
            .unwrap_or_default())
    }
}
