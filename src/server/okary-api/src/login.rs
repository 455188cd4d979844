//! `POST /login`.

use axum::extract::State;
use axum::Json;
use okary_auth::{Credentials, Principal};
use serde::Serialize;
use tracing::info;

use crate::{ApiError, AppState};

/// Successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Expiry as seconds since the Unix epoch.
    pub expires_at: u64,
    pub principal: Principal,
}

/// Exchanges credentials for a signed token.
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LoginResponse>, ApiError> {
    let principal = state.verifier.verify(&credentials).await?;
    let issued = state.codec.sign(&principal)?;

    info!(user_id = principal.id, "Login succeeded");

    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        principal,
    }))
}
