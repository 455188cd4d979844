//! HTTP error responses for the non-GraphQL routes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use okary_auth::AuthError;
use okary_storage::StorageError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors returned by the login and image handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or rejected credential. Rendered with an empty body.
    #[error("unauthorized")]
    Unauthorized,

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Multipart upload without a file field.
    #[error("no file uploaded")]
    MissingFile,

    /// Upload larger than the accepted maximum.
    #[error("file exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Upload content type is not an accepted image type.
    #[error("file type not allowed: {0}")]
    UnsupportedMediaType(String),

    /// Unexpected failure; details are logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingFile => StatusCode::NOT_ACCEPTABLE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::Unauthorized => status.into_response(),
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                (status, Json(json!({ "error": "internal server error" }))).into_response()
            },
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::NotFound(what),
            StorageError::InvalidInput(msg) | StorageError::AlreadyExists(msg) => {
                ApiError::BadRequest(msg)
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::TokenExpired
            | AuthError::Unauthorized(_) => ApiError::Unauthorized,
            AuthError::Storage(err) => ApiError::Internal(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}
