//! Record store traits, one per entity.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::model::{
    Album, AlbumChanges, NewAlbum, NewPlaylist, NewSong, NewUser, Playlist, PlaylistChanges,
    Song, SongChanges, User, UserChanges,
};

/// User account storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by primary key.
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError>;

    /// Get a user by exact email match.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// List users ordered by username.
    async fn list_users(&self, limit: Option<u32>) -> Result<Vec<User>, StorageError>;

    /// Insert a user. Fails with `AlreadyExists` on a duplicate email or username.
    async fn create_user(&self, user: NewUser) -> Result<User, StorageError>;

    /// Apply a partial update and return the updated record.
    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, StorageError>;

    /// Delete a user and return the deleted record.
    async fn delete_user(&self, id: i64) -> Result<User, StorageError>;
}

/// Song catalog storage.
#[async_trait]
pub trait SongStore: Send + Sync {
    async fn get_song(&self, id: i64) -> Result<Option<Song>, StorageError>;

    /// List songs ordered by title.
    async fn list_songs(&self, limit: Option<u32>) -> Result<Vec<Song>, StorageError>;

    async fn create_song(&self, song: NewSong) -> Result<Song, StorageError>;

    async fn update_song(&self, id: i64, changes: SongChanges) -> Result<Song, StorageError>;

    async fn delete_song(&self, id: i64) -> Result<Song, StorageError>;
}

/// Album catalog storage.
#[async_trait]
pub trait AlbumStore: Send + Sync {
    async fn get_album(&self, id: i64) -> Result<Option<Album>, StorageError>;

    /// List albums ordered by title.
    async fn list_albums(&self, limit: Option<u32>) -> Result<Vec<Album>, StorageError>;

    async fn create_album(&self, album: NewAlbum) -> Result<Album, StorageError>;

    async fn update_album(&self, id: i64, changes: AlbumChanges) -> Result<Album, StorageError>;

    async fn delete_album(&self, id: i64) -> Result<Album, StorageError>;
}

/// Playlist and playlist membership storage.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn get_playlist(&self, id: i64) -> Result<Option<Playlist>, StorageError>;

    /// List playlists ordered by name.
    async fn list_playlists(&self, limit: Option<u32>) -> Result<Vec<Playlist>, StorageError>;

    /// List the playlists owned by a user.
    async fn list_playlists_by_user(&self, user_id: i64) -> Result<Vec<Playlist>, StorageError>;

    /// Insert a playlist. Fails with `InvalidInput` if the owner does not exist.
    async fn create_playlist(&self, playlist: NewPlaylist) -> Result<Playlist, StorageError>;

    async fn update_playlist(
        &self,
        id: i64,
        changes: PlaylistChanges,
    ) -> Result<Playlist, StorageError>;

    async fn delete_playlist(&self, id: i64) -> Result<Playlist, StorageError>;

    /// Add a song to a playlist.
    async fn add_song(&self, playlist_id: i64, song_id: i64) -> Result<(), StorageError>;

    /// Remove a song from a playlist. Removing an absent entry is not an error.
    async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<(), StorageError>;

    /// Songs contained in a playlist, in insertion order.
    async fn list_playlist_songs(&self, playlist_id: i64) -> Result<Vec<Song>, StorageError>;
}
