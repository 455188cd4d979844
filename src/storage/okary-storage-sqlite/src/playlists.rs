//! `PlaylistStore` implementation.

use async_trait::async_trait;
use tracing::debug;

use okary_storage::model::{NewPlaylist, Playlist, PlaylistChanges, Song};
use okary_storage::{PlaylistStore, StorageError};

use crate::rows::{PlaylistRow, SongRow};
use crate::{query_error, sql_limit, SqliteBackend};

#[async_trait]
impl PlaylistStore for SqliteBackend {
    async fn get_playlist(&self, id: i64) -> Result<Option<Playlist>, StorageError> {
        let row: Option<PlaylistRow> =
            sqlx::query_as("SELECT id, name, description, user_id FROM playlists WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_error)?;

        Ok(row.map(Playlist::from))
    }

    async fn list_playlists(&self, limit: Option<u32>) -> Result<Vec<Playlist>, StorageError> {
        let rows: Vec<PlaylistRow> = sqlx::query_as(
            "SELECT id, name, description, user_id FROM playlists ORDER BY name ASC LIMIT ?",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(Playlist::from).collect())
    }

    async fn list_playlists_by_user(&self, user_id: i64) -> Result<Vec<Playlist>, StorageError> {
        let rows: Vec<PlaylistRow> = sqlx::query_as(
            "SELECT id, name, description, user_id FROM playlists WHERE user_id = ? ORDER BY name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(Playlist::from).collect())
    }

    async fn create_playlist(&self, playlist: NewPlaylist) -> Result<Playlist, StorageError> {
        let result =
            sqlx::query("INSERT INTO playlists (name, description, user_id) VALUES (?, ?, ?)")
                .bind(&playlist.name)
                .bind(playlist.description.as_deref())
                .bind(playlist.user_id)
                .execute(&self.pool)
                .await
                .map_err(query_error)?;

        let id = result.last_insert_rowid();
        debug!(playlist_id = id, user_id = playlist.user_id, "Playlist created");

        self.get_playlist(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("playlist {id}")))
    }

    async fn update_playlist(
        &self,
        id: i64,
        changes: PlaylistChanges,
    ) -> Result<Playlist, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE playlists SET
                name = COALESCE(?, name),
                description = COALESCE(?, description)
            WHERE id = ?
            "#,
        )
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("playlist {id}")));
        }

        self.get_playlist(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("playlist {id}")))
    }

    async fn delete_playlist(&self, id: i64) -> Result<Playlist, StorageError> {
        let playlist = self
            .get_playlist(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("playlist {id}")))?;

        sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        debug!(playlist_id = id, "Playlist deleted");

        Ok(playlist)
    }

    async fn add_song(&self, playlist_id: i64, song_id: i64) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO playlist_songs (playlist_id, song_id) VALUES (?, ?)")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        debug!(playlist_id, song_id, "Song added to playlist");

        Ok(())
    }

    async fn remove_song(&self, playlist_id: i64, song_id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM playlist_songs WHERE playlist_id = ? AND song_id = ?")
            .bind(playlist_id)
            .bind(song_id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        Ok(())
    }

    async fn list_playlist_songs(&self, playlist_id: i64) -> Result<Vec<Song>, StorageError> {
        let rows: Vec<SongRow> = sqlx::query_as(
            r#"
            SELECT s.id, s.title, s.artist, s.album, s.genre, s.duration, s.lyrics, s.photo
            FROM playlist_songs ps
            JOIN songs s ON s.id = ps.song_id
            WHERE ps.playlist_id = ?
            ORDER BY ps.id ASC
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(Song::from).collect())
    }
}
