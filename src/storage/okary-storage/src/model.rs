//! Record types shared by every storage backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::StorageError;

/// Account role.
///
/// Stored and transported as its lowercase name. Anything else fails to
/// parse, so an unknown role never reaches an authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular listener account.
    #[default]
    User,
    /// Catalog administrator.
    Admin,
}

impl Role {
    /// Returns the canonical string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(StorageError::Serialization(format!("unknown role: {other}"))),
        }
    }
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Primary key.
    pub id: i64,
    /// Unique display name.
    pub username: String,
    /// Unique login identifier.
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
}

/// Data for a new user account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Unique display name.
    pub username: String,
    /// Unique login identifier.
    pub email: String,
    /// Argon2 PHC string (never the plain password).
    pub password_hash: String,
    /// Account role.
    pub role: Role,
}

/// Partial update of a user account. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

/// A catalog song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    /// Length in seconds.
    pub duration: Option<i64>,
    pub lyrics: Option<String>,
    /// Stored image filename.
    pub photo: Option<String>,
}

/// Data for a new song.
#[derive(Debug, Clone, Default)]
pub struct NewSong {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub lyrics: Option<String>,
    pub photo: Option<String>,
}

/// Partial update of a song.
#[derive(Debug, Clone, Default)]
pub struct SongChanges {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<i64>,
    pub lyrics: Option<String>,
    pub photo: Option<String>,
}

/// A catalog album.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub photo: Option<String>,
}

/// Data for a new album.
#[derive(Debug, Clone, Default)]
pub struct NewAlbum {
    pub title: String,
    pub artist: String,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub photo: Option<String>,
}

/// Partial update of an album.
#[derive(Debug, Clone, Default)]
pub struct AlbumChanges {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub photo: Option<String>,
}

/// A user-owned playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Owning user.
    pub user_id: i64,
}

/// Data for a new playlist.
#[derive(Debug, Clone)]
pub struct NewPlaylist {
    pub name: String,
    pub description: Option<String>,
    pub user_id: i64,
}

/// Partial update of a playlist. Ownership cannot be changed.
#[derive(Debug, Clone, Default)]
pub struct PlaylistChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    }

    #[test]
    fn test_role_rejects_unknown() {
        for raw in ["Admin", "root", "", " user"] {
            assert!(
                matches!(raw.parse::<Role>(), Err(StorageError::Serialization(_))),
                "should reject role: {raw:?}"
            );
        }
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}
