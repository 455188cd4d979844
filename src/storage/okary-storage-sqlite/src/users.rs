//! `UserStore` implementation.

use async_trait::async_trait;
use tracing::debug;

use okary_storage::model::{NewUser, User, UserChanges};
use okary_storage::{StorageError, UserStore};

use crate::rows::UserRow;
use crate::{query_error, sql_limit, SqliteBackend};

#[async_trait]
impl UserStore for SqliteBackend {
    async fn get_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, email, password, role FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, username, email, password, role FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(query_error)?;

        row.map(User::try_from).transpose()
    }

    async fn list_users(&self, limit: Option<u32>) -> Result<Vec<User>, StorageError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            "SELECT id, username, email, password, role FROM users ORDER BY username ASC LIMIT ?",
        )
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StorageError> {
        let result =
            sqlx::query("INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, ?)")
                .bind(&user.username)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(user.role.as_str())
                .execute(&self.pool)
                .await
                .map_err(query_error)?;

        let id = result.last_insert_rowid();
        debug!(user_id = id, role = %user.role, "User created");

        self.get_user(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {id}")))
    }

    async fn update_user(&self, id: i64, changes: UserChanges) -> Result<User, StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = COALESCE(?, username),
                email = COALESCE(?, email),
                role = COALESCE(?, role)
            WHERE id = ?
            "#,
        )
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.role.map(|r| r.as_str()))
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(format!("user {id}")));
        }

        self.get_user(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {id}")))
    }

    async fn delete_user(&self, id: i64) -> Result<User, StorageError> {
        let user = self
            .get_user(id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {id}")))?;

        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(query_error)?;

        debug!(user_id = id, "User deleted");

        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::tests::{new_user, setup};
    use okary_storage::model::Role;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let (_tmp, backend) = setup().await;

        let created = backend
            .create_user(new_user("ana", "ana@example.com"))
            .await
            .unwrap();
        assert_eq!(created.username, "ana");
        assert_eq!(created.role, Role::User);

        let by_id = backend.get_user(created.id).await.unwrap();
        assert_eq!(by_id.as_ref(), Some(&created));

        let by_email = backend.find_user_by_email("ana@example.com").await.unwrap();
        assert_eq!(by_email, Some(created));
    }

    #[tokio::test]
    async fn test_email_lookup_is_exact() {
        let (_tmp, backend) = setup().await;
        backend
            .create_user(new_user("ana", "ana@example.com"))
            .await
            .unwrap();

        assert!(backend
            .find_user_by_email("ANA@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(backend.find_user_by_email("ana@").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (_tmp, backend) = setup().await;
        backend
            .create_user(new_user("ana", "ana@example.com"))
            .await
            .unwrap();

        let result = backend
            .create_user(new_user("ana2", "ana@example.com"))
            .await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_list_ordered_by_username() {
        let (_tmp, backend) = setup().await;
        for (name, email) in [("zoe", "z@x.io"), ("ana", "a@x.io"), ("max", "m@x.io")] {
            backend.create_user(new_user(name, email)).await.unwrap();
        }

        let names: Vec<String> = backend
            .list_users(None)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["ana", "max", "zoe"]);

        let limited = backend.list_users(Some(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let (_tmp, backend) = setup().await;
        let user = backend
            .create_user(new_user("ana", "ana@example.com"))
            .await
            .unwrap();

        let updated = backend
            .update_user(
                user.id,
                UserChanges {
                    role: Some(Role::Admin),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.username, "ana");
        assert_eq!(updated.email, "ana@example.com");
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (_tmp, backend) = setup().await;
        let result = backend.update_user(42, UserChanges::default()).await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_returns_record() {
        let (_tmp, backend) = setup().await;
        let user = backend
            .create_user(new_user("ana", "ana@example.com"))
            .await
            .unwrap();

        let deleted = backend.delete_user(user.id).await.unwrap();
        assert_eq!(deleted, user);
        assert!(backend.get_user(user.id).await.unwrap().is_none());

        let again = backend.delete_user(user.id).await;
        assert!(matches!(again, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_stored_role_is_an_error() {
        let (_tmp, backend) = setup().await;
        sqlx::query("INSERT INTO users (username, email, password, role) VALUES (?, ?, ?, ?)")
            .bind("eve")
            .bind("eve@example.com")
            .bind("x")
            .bind("superuser")
            .execute(&backend.pool)
            .await
            .unwrap();

        let result = backend.find_user_by_email("eve@example.com").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
