use async_graphql::{Context, Object, Result};
use okary_auth::guard;

use super::types::{AlbumObject, PlaylistObject, SongObject, UserObject};
use super::{auth_error, catalog, execution_context, not_found, storage_error};
use crate::policy;

/// Read operations.
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The caller, or null when anonymous.
    async fn me(&self, ctx: &Context<'_>) -> Option<UserObject> {
        execution_context(ctx).principal().map(UserObject::from)
    }

    async fn song(&self, ctx: &Context<'_>, id: i64) -> Result<SongObject> {
        let song = catalog(ctx)?
            .songs
            .get_song(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| not_found(format!("song {id}")))?;
        Ok(SongObject::from(song))
    }

    /// Songs ordered by title.
    async fn songs(&self, ctx: &Context<'_>, limit: Option<u32>) -> Result<Vec<SongObject>> {
        let songs = catalog(ctx)?
            .songs
            .list_songs(limit)
            .await
            .map_err(storage_error)?;
        Ok(songs.into_iter().map(SongObject::from).collect())
    }

    async fn album(&self, ctx: &Context<'_>, id: i64) -> Result<AlbumObject> {
        let album = catalog(ctx)?
            .albums
            .get_album(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| not_found(format!("album {id}")))?;
        Ok(AlbumObject::from(album))
    }

    /// Albums ordered by title.
    async fn albums(&self, ctx: &Context<'_>, limit: Option<u32>) -> Result<Vec<AlbumObject>> {
        let albums = catalog(ctx)?
            .albums
            .list_albums(limit)
            .await
            .map_err(storage_error)?;
        Ok(albums.into_iter().map(AlbumObject::from).collect())
    }

    async fn playlist(&self, ctx: &Context<'_>, id: i64) -> Result<PlaylistObject> {
        let playlist = catalog(ctx)?
            .playlists
            .get_playlist(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| not_found(format!("playlist {id}")))?;
        Ok(PlaylistObject::from(playlist))
    }

    /// Playlists ordered by name.
    async fn playlists(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
    ) -> Result<Vec<PlaylistObject>> {
        let playlists = catalog(ctx)?
            .playlists
            .list_playlists(limit)
            .await
            .map_err(storage_error)?;
        Ok(playlists.into_iter().map(PlaylistObject::from).collect())
    }

    async fn playlists_by_user(
        &self,
        ctx: &Context<'_>,
        user_id: i64,
    ) -> Result<Vec<PlaylistObject>> {
        let playlists = catalog(ctx)?
            .playlists
            .list_playlists_by_user(user_id)
            .await
            .map_err(storage_error)?;
        Ok(playlists.into_iter().map(PlaylistObject::from).collect())
    }

    /// A user account; visible to its owner and to admins.
    async fn user(&self, ctx: &Context<'_>, id: i64) -> Result<UserObject> {
        guard::require_owner_or(execution_context(ctx), id, policy::ADMIN).map_err(auth_error)?;

        let user = catalog(ctx)?
            .users
            .get_user(id)
            .await
            .map_err(storage_error)?
            .ok_or_else(|| not_found(format!("user {id}")))?;
        Ok(UserObject::from(user))
    }

    /// All accounts ordered by username. Admin only.
    async fn users(&self, ctx: &Context<'_>, limit: Option<u32>) -> Result<Vec<UserObject>> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;

        let users = catalog(ctx)?
            .users
            .list_users(limit)
            .await
            .map_err(storage_error)?;
        Ok(users.into_iter().map(UserObject::from).collect())
    }
}
