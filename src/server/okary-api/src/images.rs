//! Image upload and download.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use okary_auth::{guard, ExecutionContext};
use okary_storage::media::{is_allowed_image_type, MAX_IMAGE_BYTES};
use okary_storage::{ImageKind, ImageUpload, StoredImage};
use serde::Serialize;
use tracing::{debug, error};

use crate::extract::RequestPrincipal;
use crate::{policy, ApiError, AppState};

/// Upload response body.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub content_type: String,
}

impl From<StoredImage> for UploadResponse {
    fn from(stored: StoredImage) -> Self {
        Self {
            filename: stored.filename,
            content_type: stored.content_type,
        }
    }
}

fn parse_kind(kind: &str) -> Result<ImageKind, ApiError> {
    kind.parse::<ImageKind>()
        .map_err(|_| ApiError::NotFound(format!("image kind {kind}")))
}

/// `POST /images/{kind}`: stores the first file field of a multipart body.
pub async fn upload_image(
    State(state): State<AppState>,
    RequestPrincipal(principal): RequestPrincipal,
    Path(kind): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let ctx = ExecutionContext::from_request(principal);
    let uploader = guard::require(&ctx, policy::MEMBERS)?;
    let kind = parse_kind(&kind)?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!(error = %e, "Failed to read multipart field");
        ApiError::BadRequest(e.to_string())
    })? {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            debug!("Skipping field without filename");
            continue;
        };

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !is_allowed_image_type(&content_type) {
            return Err(ApiError::UnsupportedMediaType(content_type));
        }

        let bytes = field.bytes().await.map_err(|e| match e.status() {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(MAX_IMAGE_BYTES),
            _ => ApiError::BadRequest(e.to_string()),
        })?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::PayloadTooLarge(MAX_IMAGE_BYTES));
        }

        let stored = state
            .images
            .save(
                kind,
                ImageUpload {
                    original_name,
                    content_type,
                    bytes: bytes.to_vec(),
                },
            )
            .await?;

        debug!(user_id = uploader.id, filename = %stored.filename, "Image uploaded");
        return Ok((StatusCode::CREATED, Json(stored.into())));
    }

    Err(ApiError::MissingFile)
}

/// `GET /images/{kind}/{filename}`: serves a stored image.
pub async fn download_image(
    State(state): State<AppState>,
    Path((kind, filename)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&kind)?;
    let image = state.images.load(kind, &filename).await?;

    Ok(([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response())
}
