//! # Okary Storage - SQLite Backend
//!
//! SQLite implementation of every Okary record store. One database file
//! holds users, songs, albums, playlists and playlist membership.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod playlists;
mod rows;
mod users;

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

use okary_storage::StorageError;

/// SQL schema for the music catalog.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    username  TEXT NOT NULL UNIQUE,
    email     TEXT NOT NULL UNIQUE,
    password  TEXT NOT NULL,
    role      TEXT NOT NULL DEFAULT 'user'
);

CREATE TABLE IF NOT EXISTS albums (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    title   TEXT NOT NULL,
    artist  TEXT NOT NULL,
    year    INTEGER,
    genre   TEXT,
    photo   TEXT
);

CREATE TABLE IF NOT EXISTS songs (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    title     TEXT NOT NULL,
    artist    TEXT NOT NULL,
    album     TEXT,
    genre     TEXT,
    duration  INTEGER,
    lyrics    TEXT,
    photo     TEXT
);

CREATE TABLE IF NOT EXISTS playlists (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    description  TEXT,
    user_id      INTEGER NOT NULL REFERENCES users (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS playlist_songs (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    playlist_id  INTEGER NOT NULL REFERENCES playlists (id) ON DELETE CASCADE,
    song_id      INTEGER NOT NULL REFERENCES songs (id) ON DELETE CASCADE,
    UNIQUE (playlist_id, song_id)
);

CREATE INDEX IF NOT EXISTS idx_playlists_user ON playlists (user_id);
CREATE INDEX IF NOT EXISTS idx_playlist_songs_playlist ON playlist_songs (playlist_id)
"#;

/// Tables in drop order (children first).
const TABLES: &[&str] = &["playlist_songs", "playlists", "songs", "albums", "users"];

/// SQLite storage backend.
///
/// The database lives at `{base_path}/{name}.db`. Foreign keys are enforced
/// on every pooled connection.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteBackend {
    /// Opens or creates a SQLite database and applies the schema.
    ///
    /// # Arguments
    ///
    /// * `base_path` - Directory where the database file is stored
    /// * `name` - Database name (must match `[a-z0-9_-]+`)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The database name is invalid
    /// - Directory cannot be created
    /// - Database connection or migration fails
    pub async fn open(base_path: impl AsRef<Path>, name: &str) -> Result<Self, StorageError> {
        Self::validate_name(name)?;

        let base = base_path.as_ref();
        std::fs::create_dir_all(base).map_err(|e| {
            StorageError::ConnectionFailed(format!("failed to create directory: {e}"))
        })?;

        let db_path = base.join(format!("{name}.db"));

        debug!(database = %name, path = %db_path.display(), "Opening SQLite database");

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let backend = Self { pool, db_path };

        backend.migrate().await?;

        info!(database = %name, "SQLite backend ready");

        Ok(backend)
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Validates that a database name is safe to use as a file name.
    ///
    /// Only allows: lowercase letters, digits, underscore, hyphen.
    fn validate_name(name: &str) -> Result<(), StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidInput("database name cannot be empty".into()));
        }

        if name.len() > 64 {
            return Err(StorageError::InvalidInput("database name too long".into()));
        }

        let valid = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');

        if !valid {
            return Err(StorageError::InvalidInput(
                "database name must match [a-z0-9_-]+".into(),
            ));
        }

        Ok(())
    }

    /// Runs database migrations.
    async fn migrate(&self) -> Result<(), StorageError> {
        debug!("Running database migrations");

        self.execute_raw(SCHEMA)
            .await
            .map_err(|e| StorageError::ConnectionFailed(format!("migration failed: {e}")))?;

        debug!("Migrations complete");

        Ok(())
    }

    /// Drops every table and recreates an empty schema.
    pub async fn reset(&self) -> Result<(), StorageError> {
        warn!(path = %self.db_path.display(), "Resetting database schema");

        for table in TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&self.pool)
                .await
                .map_err(query_error)?;
        }

        self.migrate().await
    }

    /// Executes raw SQL statements (for migrations/schema creation).
    pub async fn execute_raw(&self, sql: &str) -> Result<(), StorageError> {
        for statement in sql.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement.trim())
                .execute(&self.pool)
                .await
                .map_err(query_error)?;
        }
        Ok(())
    }
}

/// Maps a sqlx error onto the storage taxonomy.
///
/// Constraint violations are reported as caller errors rather than
/// query failures.
pub(crate) fn query_error(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::AlreadyExists(db.message().to_string());
        }
        if db.is_foreign_key_violation() {
            return StorageError::InvalidInput(db.message().to_string());
        }
    }
    StorageError::QueryFailed(e.to_string())
}

/// `LIMIT` argument; SQLite treats a negative limit as unbounded.
///
/// A limit of zero means no limit, like an absent one.
pub(crate) fn sql_limit(limit: Option<u32>) -> i64 {
    match limit {
        Some(n) if n > 0 => i64::from(n),
        _ => -1,
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
pub(crate) mod tests {
    use super::*;
    use okary_storage::model::{NewSong, NewUser, Role};
    use okary_storage::{SongStore, UserStore};
    use tempfile::TempDir;

    pub(crate) async fn setup() -> (TempDir, SqliteBackend) {
        let tmp = TempDir::new().unwrap();
        let backend = SqliteBackend::open(tmp.path(), "test-catalog").await.unwrap();
        (tmp, backend)
    }

    pub(crate) fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
            role: Role::User,
        }
    }

    pub(crate) fn new_song(title: &str, artist: &str) -> NewSong {
        NewSong {
            title: title.to_string(),
            artist: artist.to_string(),
            ..NewSong::default()
        }
    }

    #[tokio::test]
    async fn test_open_creates_db() {
        let tmp = TempDir::new().unwrap();
        let backend = SqliteBackend::open(tmp.path(), "music").await.unwrap();

        let db_path = tmp.path().join("music.db");
        assert!(db_path.exists(), "database file should be created");
        assert_eq!(backend.path(), db_path.as_path());
    }

    #[tokio::test]
    async fn test_name_validation_empty() {
        let tmp = TempDir::new().unwrap();
        let result = SqliteBackend::open(tmp.path(), "").await;
        assert!(matches!(result, Err(StorageError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_name_validation_invalid_chars() {
        let tmp = TempDir::new().unwrap();

        let invalid_names = ["Music", "my music", "music/sub", "../escape", "music.db"];

        for name in invalid_names {
            let result = SqliteBackend::open(tmp.path(), name).await;
            assert!(
                matches!(result, Err(StorageError::InvalidInput(_))),
                "should reject database name: {name}"
            );
        }
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let tmp = TempDir::new().unwrap();

        {
            let backend = SqliteBackend::open(tmp.path(), "music").await.unwrap();
            backend.create_song(new_song("Intro", "The XX")).await.unwrap();
        }

        let backend = SqliteBackend::open(tmp.path(), "music").await.unwrap();
        let songs = backend.list_songs(None).await.unwrap();
        assert_eq!(songs.len(), 1);
    }

    #[tokio::test]
    async fn test_reset_empties_tables() {
        let (_tmp, backend) = setup().await;

        backend.create_user(new_user("ana", "ana@example.com")).await.unwrap();
        backend.create_song(new_song("Intro", "The XX")).await.unwrap();

        backend.reset().await.unwrap();

        assert!(backend.list_users(None).await.unwrap().is_empty());
        assert!(backend.list_songs(None).await.unwrap().is_empty());

        // Schema is usable again after reset
        backend.create_user(new_user("ana", "ana@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_limit_lists_everything() {
        let (_tmp, backend) = setup().await;
        backend.create_song(new_song("Intro", "The XX")).await.unwrap();
        backend.create_song(new_song("Islands", "The XX")).await.unwrap();

        assert_eq!(backend.list_songs(Some(0)).await.unwrap().len(), 2);
        assert_eq!(backend.list_songs(Some(1)).await.unwrap().len(), 1);
    }

    #[test]
    fn test_sql_limit() {
        assert_eq!(sql_limit(None), -1);
        assert_eq!(sql_limit(Some(0)), -1);
        assert_eq!(sql_limit(Some(25)), 25);
    }
}
