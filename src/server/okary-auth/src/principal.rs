//! Authenticated identity.

use serde::{Deserialize, Serialize};

use okary_storage::model::User;
use okary_storage::Role;

/// The authenticated identity attached to a request or connection.
///
/// Built from a stored user at login or from verified token claims.
/// Lives for one request or connection and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User primary key.
    pub id: i64,
    /// Display name.
    pub username: String,
    /// Login identifier.
    pub email: String,
    /// Account role.
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
