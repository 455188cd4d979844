use async_graphql::{Context, Object, Result};
use okary_auth::{guard, hash_password, ExecutionContext};
use okary_storage::model::{NewPlaylist, NewUser, Playlist, UserChanges};
use okary_storage::Role;
use tracing::info;

use super::types::{
    AlbumObject, CreateAlbumInput, CreatePlaylistInput, CreateSongInput, CreateUserInput,
    PlaylistObject, SongObject, UpdateAlbumInput, UpdatePlaylistInput, UpdateSongInput,
    UpdateUserInput, UserObject,
};
use super::{auth_error, bad_input, catalog, execution_context, not_found, storage_error};
use crate::policy;

/// Write operations. Each one runs the guard before any store call.
pub struct MutationRoot;

fn non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(bad_input(format!("{field} must not be empty")));
    }
    Ok(())
}

fn non_blank_opt(field: &str, value: Option<&String>) -> Result<()> {
    value.map_or(Ok(()), |value| non_blank(field, value))
}

/// Loads a playlist and checks that the caller owns it or is an admin.
async fn owned_playlist(ctx: &Context<'_>, exec: &ExecutionContext, id: i64) -> Result<Playlist> {
    guard::require(exec, policy::MEMBERS).map_err(auth_error)?;

    let playlist = catalog(ctx)?
        .playlists
        .get_playlist(id)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| not_found(format!("playlist {id}")))?;

    guard::require_owner_or(exec, playlist.user_id, policy::ADMIN).map_err(auth_error)?;
    Ok(playlist)
}

#[Object]
impl MutationRoot {
    async fn create_song(&self, ctx: &Context<'_>, input: CreateSongInput) -> Result<SongObject> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;
        non_blank("title", &input.title)?;
        non_blank("artist", &input.artist)?;

        let song = catalog(ctx)?
            .songs
            .create_song(input.into())
            .await
            .map_err(storage_error)?;
        Ok(song.into())
    }

    async fn update_song(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: UpdateSongInput,
    ) -> Result<SongObject> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;
        non_blank_opt("title", input.title.as_ref())?;
        non_blank_opt("artist", input.artist.as_ref())?;

        let song = catalog(ctx)?
            .songs
            .update_song(id, input.into())
            .await
            .map_err(storage_error)?;
        Ok(song.into())
    }

    async fn delete_song(&self, ctx: &Context<'_>, id: i64) -> Result<SongObject> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;

        let song = catalog(ctx)?
            .songs
            .delete_song(id)
            .await
            .map_err(storage_error)?;
        Ok(song.into())
    }

    async fn create_album(&self, ctx: &Context<'_>, input: CreateAlbumInput) -> Result<AlbumObject> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;
        non_blank("title", &input.title)?;
        non_blank("artist", &input.artist)?;

        let album = catalog(ctx)?
            .albums
            .create_album(input.into())
            .await
            .map_err(storage_error)?;
        Ok(album.into())
    }

    async fn update_album(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: UpdateAlbumInput,
    ) -> Result<AlbumObject> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;
        non_blank_opt("title", input.title.as_ref())?;
        non_blank_opt("artist", input.artist.as_ref())?;

        let album = catalog(ctx)?
            .albums
            .update_album(id, input.into())
            .await
            .map_err(storage_error)?;
        Ok(album.into())
    }

    async fn delete_album(&self, ctx: &Context<'_>, id: i64) -> Result<AlbumObject> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;

        let album = catalog(ctx)?
            .albums
            .delete_album(id)
            .await
            .map_err(storage_error)?;
        Ok(album.into())
    }

    /// Creates a playlist owned by the caller, or by `userId` for admins.
    async fn create_playlist(
        &self,
        ctx: &Context<'_>,
        input: CreatePlaylistInput,
    ) -> Result<PlaylistObject> {
        let exec = execution_context(ctx);
        let caller = guard::require(exec, policy::MEMBERS).map_err(auth_error)?;
        non_blank("name", &input.name)?;

        let owner = input.user_id.unwrap_or(caller.id);
        if owner != caller.id {
            guard::require(exec, policy::ADMIN).map_err(auth_error)?;
        }

        let playlist = catalog(ctx)?
            .playlists
            .create_playlist(NewPlaylist {
                name: input.name,
                description: input.description,
                user_id: owner,
            })
            .await
            .map_err(storage_error)?;
        Ok(playlist.into())
    }

    async fn update_playlist(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: UpdatePlaylistInput,
    ) -> Result<PlaylistObject> {
        owned_playlist(ctx, execution_context(ctx), id).await?;
        non_blank_opt("name", input.name.as_ref())?;

        let playlist = catalog(ctx)?
            .playlists
            .update_playlist(id, input.into())
            .await
            .map_err(storage_error)?;
        Ok(playlist.into())
    }

    async fn delete_playlist(&self, ctx: &Context<'_>, id: i64) -> Result<PlaylistObject> {
        owned_playlist(ctx, execution_context(ctx), id).await?;

        let playlist = catalog(ctx)?
            .playlists
            .delete_playlist(id)
            .await
            .map_err(storage_error)?;
        Ok(playlist.into())
    }

    async fn add_song_to_playlist(
        &self,
        ctx: &Context<'_>,
        playlist_id: i64,
        song_id: i64,
    ) -> Result<PlaylistObject> {
        let playlist = owned_playlist(ctx, execution_context(ctx), playlist_id).await?;

        catalog(ctx)?
            .playlists
            .add_song(playlist_id, song_id)
            .await
            .map_err(storage_error)?;
        Ok(playlist.into())
    }

    async fn remove_song_from_playlist(
        &self,
        ctx: &Context<'_>,
        playlist_id: i64,
        song_id: i64,
    ) -> Result<PlaylistObject> {
        let playlist = owned_playlist(ctx, execution_context(ctx), playlist_id).await?;

        catalog(ctx)?
            .playlists
            .remove_song(playlist_id, song_id)
            .await
            .map_err(storage_error)?;
        Ok(playlist.into())
    }

    /// Registers an account. Open to anyone; only admins may create admins.
    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> Result<UserObject> {
        let role = input.role.map(Role::from).unwrap_or_default();
        if role == Role::Admin {
            guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;
        }
        non_blank("username", &input.username)?;
        non_blank("email", &input.email)?;
        non_blank("password", &input.password)?;

        let password_hash = hash_password(&input.password).map_err(auth_error)?;
        let user = catalog(ctx)?
            .users
            .create_user(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                role,
            })
            .await
            .map_err(storage_error)?;

        info!(user_id = user.id, role = %user.role, "User created");
        Ok(user.into())
    }

    /// Updates an account. Owners may edit themselves; role changes need an admin.
    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<UserObject> {
        let exec = execution_context(ctx);
        guard::require_owner_or(exec, id, policy::ADMIN).map_err(auth_error)?;
        if input.role.is_some() {
            guard::require(exec, policy::ADMIN).map_err(auth_error)?;
        }
        non_blank_opt("username", input.username.as_ref())?;
        non_blank_opt("email", input.email.as_ref())?;

        let changes = UserChanges {
            username: input.username,
            email: input.email,
            role: input.role.map(Role::from),
        };
        let user = catalog(ctx)?
            .users
            .update_user(id, changes)
            .await
            .map_err(storage_error)?;
        Ok(user.into())
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: i64) -> Result<UserObject> {
        guard::require(execution_context(ctx), policy::ADMIN).map_err(auth_error)?;

        let user = catalog(ctx)?
            .users
            .delete_user(id)
            .await
            .map_err(storage_error)?;

        info!(user_id = user.id, "User deleted");
        Ok(user.into())
    }
}
