use async_graphql::{ComplexObject, Context, Enum, InputObject, SimpleObject};
use okary_auth::Principal;
use okary_storage::model::{
    Album, AlbumChanges, NewAlbum, NewSong, Playlist, PlaylistChanges, Song, SongChanges, User,
};
use okary_storage::Role;

use super::{catalog, storage_error};

/// Account role as exposed over GraphQL.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq)]
#[graphql(name = "Role", rename_items = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl From<Role> for UserRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => UserRole::User,
            Role::Admin => UserRole::Admin,
        }
    }
}

impl From<UserRole> for Role {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::User => Role::User,
            UserRole::Admin => Role::Admin,
        }
    }
}

/// A user account. The password hash is never exposed.
#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "User")]
pub struct UserObject {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<User> for UserObject {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role.into(),
        }
    }
}

impl From<&Principal> for UserObject {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username.clone(),
            email: principal.email.clone(),
            role: principal.role.into(),
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Song")]
pub struct SongObject {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Length in seconds.
    pub duration: Option<i64>,
    pub lyrics: Option<String>,
    /// Image filename, served under `/images/song/`.
    pub photo: Option<String>,
}

impl From<Song> for SongObject {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            title: song.title,
            artist: song.artist,
            album: song.album,
            genre: song.genre,
            duration: song.duration,
            lyrics: song.lyrics,
            photo: song.photo,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Album")]
pub struct AlbumObject {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub year: Option<i64>,
    pub genre: Option<String>,
    /// Image filename, served under `/images/album/`.
    pub photo: Option<String>,
}

impl From<Album> for AlbumObject {
    fn from(album: Album) -> Self {
        Self {
            id: album.id,
            title: album.title,
            artist: album.artist,
            year: album.year,
            genre: album.genre,
            photo: album.photo,
        }
    }
}

#[derive(SimpleObject, Debug, Clone)]
#[graphql(name = "Playlist", complex)]
pub struct PlaylistObject {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
}

#[ComplexObject]
impl PlaylistObject {
    /// Songs in insertion order.
    async fn songs(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<SongObject>> {
        let songs = catalog(ctx)?
            .playlists
            .list_playlist_songs(self.id)
            .await
            .map_err(storage_error)?;
        Ok(songs.into_iter().map(SongObject::from).collect())
    }

    /// Owner of the playlist.
    async fn user(&self, ctx: &Context<'_>) -> async_graphql::Result<Option<UserObject>> {
        let user = catalog(ctx)?
            .users
            .get_user(self.user_id)
            .await
            .map_err(storage_error)?;
        Ok(user.map(UserObject::from))
    }
}

impl From<Playlist> for PlaylistObject {
    fn from(playlist: Playlist) -> Self {
        Self {
            id: playlist.id,
            name: playlist.name,
            description: playlist.description,
            user_id: playlist.user_id,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct CreateSongInput {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub lyrics: Option<String>,
    pub photo: Option<String>,
}

impl From<CreateSongInput> for NewSong {
    fn from(input: CreateSongInput) -> Self {
        Self {
            title: input.title,
            artist: input.artist,
            album: input.album,
            genre: input.genre,
            duration: input.duration,
            lyrics: input.lyrics,
            photo: input.photo,
        }
    }
}

#[derive(InputObject, Debug, Default)]
pub struct UpdateSongInput {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub lyrics: Option<String>,
    pub photo: Option<String>,
}

impl From<UpdateSongInput> for SongChanges {
    fn from(input: UpdateSongInput) -> Self {
        Self {
            title: input.title,
            artist: input.artist,
            album: input.album,
            genre: input.genre,
            duration: input.duration,
            lyrics: input.lyrics,
            photo: input.photo,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct CreateAlbumInput {
    pub title: String,
    pub artist: String,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub photo: Option<String>,
}

impl From<CreateAlbumInput> for NewAlbum {
    fn from(input: CreateAlbumInput) -> Self {
        Self {
            title: input.title,
            artist: input.artist,
            year: input.year,
            genre: input.genre,
            photo: input.photo,
        }
    }
}

#[derive(InputObject, Debug, Default)]
pub struct UpdateAlbumInput {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub photo: Option<String>,
}

impl From<UpdateAlbumInput> for AlbumChanges {
    fn from(input: UpdateAlbumInput) -> Self {
        Self {
            title: input.title,
            artist: input.artist,
            year: input.year,
            genre: input.genre,
            photo: input.photo,
        }
    }
}

#[derive(InputObject, Debug)]
pub struct CreatePlaylistInput {
    pub name: String,
    pub description: Option<String>,
    /// Owner; defaults to the caller.
    pub user_id: Option<i64>,
}

#[derive(InputObject, Debug, Default)]
pub struct UpdatePlaylistInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<UpdatePlaylistInput> for PlaylistChanges {
    fn from(input: UpdatePlaylistInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
        }
    }
}

#[derive(InputObject)]
pub struct CreateUserInput {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to `user`; `admin` requires an admin caller.
    pub role: Option<UserRole>,
}

#[derive(InputObject, Debug, Default)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    /// Requires an admin caller.
    pub role: Option<UserRole>,
}
