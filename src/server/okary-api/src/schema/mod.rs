//! GraphQL schema.
//!
//! Every resolver reads the [`ExecutionContext`] built by the transport and
//! runs the guard before touching a store. Failures carry a machine-readable
//! `extensions.code`.

mod mutation;
mod query;
mod types;

use async_graphql::{Context, EmptySubscription, Error, ErrorExtensions, Schema};
use okary_auth::{AuthError, ExecutionContext};
use okary_storage::StorageError;
use tracing::error;

use crate::Catalog;

pub use mutation::MutationRoot;
pub use query::QueryRoot;
pub use types::{
    AlbumObject, CreateAlbumInput, CreatePlaylistInput, CreateSongInput, CreateUserInput,
    PlaylistObject, SongObject, UpdateAlbumInput, UpdatePlaylistInput, UpdateSongInput,
    UpdateUserInput, UserObject, UserRole,
};

/// The Okary GraphQL schema.
pub type OkarySchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Values of `extensions.code`.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const BAD_USER_INPUT: &str = "BAD_USER_INPUT";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Builds the schema over the given stores.
pub fn build_schema(catalog: Catalog) -> OkarySchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(catalog)
        .finish()
}

static ANONYMOUS: ExecutionContext = ExecutionContext::anonymous();

/// Context of the running operation; anonymous if the transport attached none.
pub(crate) fn execution_context<'a>(ctx: &Context<'a>) -> &'a ExecutionContext {
    ctx.data_opt::<ExecutionContext>().unwrap_or(&ANONYMOUS)
}

pub(crate) fn catalog<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Catalog> {
    ctx.data::<Catalog>()
        .map_err(|_| coded("internal server error", codes::INTERNAL_SERVER_ERROR))
}

fn coded(message: impl Into<String>, code: &'static str) -> Error {
    Error::new(message).extend_with(|_, ext| ext.set("code", code))
}

pub(crate) fn not_found(what: impl std::fmt::Display) -> Error {
    coded(format!("{what} not found"), codes::NOT_FOUND)
}

pub(crate) fn bad_input(message: impl Into<String>) -> Error {
    coded(message, codes::BAD_USER_INPUT)
}

pub(crate) fn unauthorized() -> Error {
    coded("unauthorized", codes::UNAUTHORIZED)
}

pub(crate) fn storage_error(err: StorageError) -> Error {
    match err {
        StorageError::NotFound(what) => coded(format!("{what} not found"), codes::NOT_FOUND),
        StorageError::AlreadyExists(what) => coded(what, codes::ALREADY_EXISTS),
        StorageError::InvalidInput(msg) => coded(msg, codes::BAD_USER_INPUT),
        other => {
            error!(error = %other, "Storage failure in resolver");
            coded("internal server error", codes::INTERNAL_SERVER_ERROR)
        },
    }
}

pub(crate) fn auth_error(err: AuthError) -> Error {
    match err {
        AuthError::Storage(err) => storage_error(err),
        AuthError::Hashing(_) | AuthError::Configuration(_) => {
            error!(error = %err, "Auth failure in resolver");
            coded("internal server error", codes::INTERNAL_SERVER_ERROR)
        },
        _ => unauthorized(),
    }
}
