//! Shared application state.

use std::sync::Arc;

use okary_auth::{AuthError, CredentialVerifier, TokenCodec};
use okary_storage::{AlbumStore, ImageStore, PlaylistStore, SongStore, UserStore};

use crate::schema::{build_schema, OkarySchema};

/// Record stores used by the resolvers.
#[derive(Clone)]
pub struct Catalog {
    pub users: Arc<dyn UserStore>,
    pub songs: Arc<dyn SongStore>,
    pub albums: Arc<dyn AlbumStore>,
    pub playlists: Arc<dyn PlaylistStore>,
}

impl Catalog {
    /// Uses one backend for every record store.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + SongStore + AlbumStore + PlaylistStore + 'static,
    {
        Self {
            users: backend.clone(),
            songs: backend.clone(),
            albums: backend.clone(),
            playlists: backend,
        }
    }
}

/// State handed to every axum handler.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub verifier: Arc<CredentialVerifier>,
    pub images: Arc<dyn ImageStore>,
    pub schema: OkarySchema,
}

impl AppState {
    /// Wires the verifier and the GraphQL schema over the given stores.
    pub fn new(
        catalog: Catalog,
        codec: Arc<TokenCodec>,
        images: Arc<dyn ImageStore>,
    ) -> Result<Self, AuthError> {
        let verifier = CredentialVerifier::new(catalog.users.clone())?;

        Ok(Self {
            codec,
            verifier: Arc::new(verifier),
            images,
            schema: build_schema(catalog),
        })
    }
}
