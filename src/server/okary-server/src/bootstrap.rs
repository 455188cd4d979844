//! Startup admin account.

use okary_auth::{hash_password, AuthError};
use okary_storage::model::NewUser;
use okary_storage::{Role, UserStore};
use tracing::info;

use crate::config::AdminBootstrap;

/// Creates the admin account unless a user already holds its email.
///
/// Returns true if an account was created.
pub async fn ensure_admin(users: &dyn UserStore, admin: &AdminBootstrap<'_>) -> Result<bool, AuthError> {
    if users.find_user_by_email(admin.email).await?.is_some() {
        info!(email = %admin.email, "Bootstrap admin already present");
        return Ok(false);
    }

    let user = users
        .create_user(NewUser {
            username: admin.username.to_string(),
            email: admin.email.to_string(),
            password_hash: hash_password(admin.password)?,
            role: Role::Admin,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(true)
}
