//! Image storage for song and album artwork.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::error::StorageError;

/// Accepted upload content types.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/svg+xml"];

/// Maximum accepted upload size (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Which catalog entity an image belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// Song artwork.
    Song,
    /// Album artwork.
    Album,
}

impl ImageKind {
    /// Directory name under the image root.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageKind::Song => "song",
            ImageKind::Album => "album",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "song" => Ok(ImageKind::Song),
            "album" => Ok(ImageKind::Album),
            other => Err(StorageError::InvalidInput(format!("unknown image kind: {other}"))),
        }
    }
}

/// An uploaded image before it is stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Client-supplied file name; only its extension is kept.
    pub original_name: String,
    /// Client-declared content type.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Descriptor of a stored image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Generated file name, unique within its kind.
    pub filename: String,
    pub content_type: String,
}

/// An image read back from storage.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Image store trait.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Validate and persist an upload, returning its generated name.
    async fn save(&self, kind: ImageKind, upload: ImageUpload) -> Result<StoredImage, StorageError>;

    /// Load a stored image by name.
    async fn load(&self, kind: ImageKind, filename: &str) -> Result<LoadedImage, StorageError>;
}

/// Returns true if the content type may be uploaded.
pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

/// Content type served for a stored file name, based on its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
