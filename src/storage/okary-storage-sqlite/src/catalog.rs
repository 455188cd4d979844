//! `SongStore` and `AlbumStore` implementations.

use async_trait::async_trait;
use tracing::debug;

use okary_storage::model::{Album, AlbumChanges, NewAlbum, NewSong, Song, SongChanges};
use okary_storage::{AlbumStore, SongStore, StorageError};

use crate::rows::{AlbumRow, SongRow};
use crate::{query_error, sql_limit, SqliteBackend};

#[async_trait]
impl SongStore for SqliteBackend {
    async fn get_song(&self, id: i64) -> Result<Option<Song>, StorageError> {
        let row: Option<SongRow> = sqlx::query_as(
            "SELECT id, title, artist, album, genre, duration, lyrics, photo FROM songs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(row.map(Song::from))
    }

    async fn list_songs(&self, limit: Option<u32>) -> Result<Vec<Song>, StorageError> {
        let rows: Vec<SongRow> = sqlx::query_as(
            r#"
            SELECT id, title, artist, album, genre, duration, lyrics, photo
            FROM songs ORDER BY title ASC LIMIT ?
            "#,
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(Song::from).collect())
    }

    async fn create_song(&self, song: NewSong) -> Result<Song, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO songs (title, artist, album, genre, duration, lyrics, photo)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&song.title)
        .bind(&song.artist)
        .bind(song.album.as_deref())
        .bind(song.genre.as_deref())
        .bind(song.duration)
        .bind(song.lyrics.as_deref())
        .bind(song.photo.as_deref())
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        let id = result.last_insert_rowid();
        debug!(song_id = id, "Song created");

        self.get_song(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("song {id}")))
    }

    async fn update_song(&self, id: i64, changes: SongChanges) -> Result<Song, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE songs SET
                title = COALESCE(?, title),
                artist = COALESCE(?, artist),
                album = COALESCE(?, album),
                genre = COALESCE(?, genre),
                duration = COALESCE(?, duration),
                lyrics = COALESCE(?, lyrics),
                photo = COALESCE(?, photo)
            WHERE id = ?
            "#,
        )
        .bind(changes.title.as_deref())
        .bind(changes.artist.as_deref())
        .bind(changes.album.as_deref())
        .bind(changes.genre.as_deref())
        .bind(changes.duration)
        .bind(changes.lyrics.as_deref())
        .bind(changes.photo.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("song {id}")));
        }

        self.get_song(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("song {id}")))
    }

    async fn delete_song(&self, id: i64) -> Result<Song, StorageError> {
        let song = self
            .get_song(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("song {id}")))?;

        sqlx::query("DELETE FROM songs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        debug!(song_id = id, "Song deleted");

        Ok(song)
    }
}

#[async_trait]
impl AlbumStore for SqliteBackend {
    async fn get_album(&self, id: i64) -> Result<Option<Album>, StorageError> {
        let row: Option<AlbumRow> =
            sqlx::query_as("SELECT id, title, artist, year, genre, photo FROM albums WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_error)?;

        Ok(row.map(Album::from))
    }

    async fn list_albums(&self, limit: Option<u32>) -> Result<Vec<Album>, StorageError> {
        let rows: Vec<AlbumRow> = sqlx::query_as(
            "SELECT id, title, artist, year, genre, photo FROM albums ORDER BY title ASC LIMIT ?",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(Album::from).collect())
    }

    async fn create_album(&self, album: NewAlbum) -> Result<Album, StorageError> {
        let result = sqlx::query(
            "INSERT INTO albums (title, artist, year, genre, photo) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&album.title)
        .bind(&album.artist)
        .bind(album.year)
        .bind(album.genre.as_deref())
        .bind(album.photo.as_deref())
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        let id = result.last_insert_rowid();
        debug!(album_id = id, "Album created");

        self.get_album(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("album {id}")))
    }

    async fn update_album(&self, id: i64, changes: AlbumChanges) -> Result<Album, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE albums SET
                title = COALESCE(?, title),
                artist = COALESCE(?, artist),
                year = COALESCE(?, year),
                genre = COALESCE(?, genre),
                photo = COALESCE(?, photo)
            WHERE id = ?
            "#,
        )
        .bind(changes.title.as_deref())
        .bind(changes.artist.as_deref())
        .bind(changes.year)
        .bind(changes.genre.as_deref())
        .bind(changes.photo.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("album {id}")));
        }

        self.get_album(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("album {id}")))
    }

    async fn delete_album(&self, id: i64) -> Result<Album, StorageError> {
        let album = self
            .get_album(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("album {id}")))?;

        sqlx::query("DELETE FROM albums WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        debug!(album_id = id, "Album deleted");

        Ok(album)
    }
}
