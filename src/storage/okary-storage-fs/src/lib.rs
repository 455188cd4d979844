//! # Okary Storage - Filesystem Images
//!
//! Stores song and album artwork as plain files under
//! `{root}/{kind}/{uuid}{ext}`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use okary_storage::media::{content_type_for, is_allowed_image_type, MAX_IMAGE_BYTES};
use okary_storage::{ImageKind, ImageStore, ImageUpload, LoadedImage, StorageError, StoredImage};

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
    max_bytes: usize,
}

impl FsImageStore {
    /// Creates a store rooted at `root`. Kind directories are created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    /// Overrides the maximum accepted upload size.
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: ImageKind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    /// Rejects names that could escape the kind directory.
    fn validate_filename(filename: &str) -> Result<(), StorageError> {
        if filename.is_empty() {
            return Err(StorageError::InvalidInput("image name is required".into()));
        }

        if filename.contains(['/', '\\']) || filename.contains("..") {
            return Err(StorageError::InvalidInput(format!(
                "invalid image name: {filename}"
            )));
        }

        Ok(())
    }

    /// Extension of the client file name, lowercased, including the dot.
    fn extension(original_name: &str) -> String {
        Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, kind: ImageKind, upload: ImageUpload) -> Result<StoredImage, StorageError> {
        if !is_allowed_image_type(&upload.content_type) {
            return Err(StorageError::InvalidInput(format!(
                "file type not allowed: {}",
                upload.content_type
            )));
        }

        if upload.bytes.len() > self.max_bytes {
            return Err(StorageError::InvalidInput(format!(
                "image exceeds {} bytes",
                self.max_bytes
            )));
        }

        let dir = self.kind_dir(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StorageError::Io(format!("failed to create {}: {e}", dir.display())))?;

        let filename = format!(
            "{}{}",
            Uuid::new_v4(),
            Self::extension(&upload.original_name)
        );
        let path = dir.join(&filename);

        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))?;

        info!(kind = %kind, filename = %filename, size = upload.bytes.len(), "Image stored");

        Ok(StoredImage {
            filename,
            content_type: upload.content_type,
        })
    }

    async fn load(&self, kind: ImageKind, filename: &str) -> Result<LoadedImage, StorageError> {
        Self::validate_filename(filename)?;

        let path = self.kind_dir(kind).join(filename);
        debug!(path = %path.display(), "Loading image");

        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(format!("image {kind}/{filename}")),
            _ => StorageError::Io(format!("failed to read {}: {e}", path.display())),
        })?;

        Ok(LoadedImage {
            bytes,
            content_type: content_type_for(filename).to_string(),
        })
    }
}
