//! # Okary Storage
//!
//! Storage abstraction layer for Okary backends.
//!
//! Provides the record model, one store trait per entity, and the image
//! store trait used for song and album artwork.

#![forbid(unsafe_code)]

pub mod backend;
pub mod error;
pub mod media;
pub mod model;

pub use backend::{AlbumStore, PlaylistStore, SongStore, UserStore};
pub use error::StorageError;
pub use media::{ImageKind, ImageStore, ImageUpload, LoadedImage, StoredImage};
pub use model::Role;
