//! Row types decoded by sqlx and their conversion into records.

use okary_storage::model::{Album, Playlist, Song, User};
use okary_storage::StorageError;

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password,
            role: row.role.parse()?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SongRow {
    id: i64,
    title: String,
    artist: String,
    album: Option<String>,
    genre: Option<String>,
    duration: Option<i64>,
    lyrics: Option<String>,
    photo: Option<String>,
}

impl From<SongRow> for Song {
    fn from(row: SongRow) -> Self {
        Song {
            id: row.id,
            title: row.title,
            artist: row.artist,
            album: row.album,
            genre: row.genre,
            duration: row.duration,
            lyrics: row.lyrics,
            photo: row.photo,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AlbumRow {
    id: i64,
    title: String,
    artist: String,
    year: Option<i64>,
    genre: Option<String>,
    photo: Option<String>,
}

impl From<AlbumRow> for Album {
    fn from(row: AlbumRow) -> Self {
        Album {
            id: row.id,
            title: row.title,
            artist: row.artist,
            year: row.year,
            genre: row.genre,
            photo: row.photo,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PlaylistRow {
    id: i64,
    name: String,
    description: Option<String>,
    user_id: i64,
}

impl From<PlaylistRow> for Playlist {
    fn from(row: PlaylistRow) -> Self {
        Playlist {
            id: row.id,
            name: row.name,
            description: row.description,
            user_id: row.user_id,
        }
    }
}
