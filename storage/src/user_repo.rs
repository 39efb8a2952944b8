//! User repository: accounts and roles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inbox_core::{User, UserRole, UserSummary};
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::models::rows::UserRow;
use crate::repository::Repository;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn find_by_email(&self, email: &str) -> StorageResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Directory listing for pickers and mentions, ordered by first name.
    pub async fn list_directory(&self) -> StorageResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT * FROM users ORDER BY first_name ASC, last_name ASC",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        rows.into_iter()
            .map(|row| User::try_from(row).map(|u| u.summary()))
            .collect()
    }

    /// Changes a user's role; returns the updated user, or `None` if no such user.
    pub async fn update_role(
        &self,
        id: &str,
        role: UserRole,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<User>> {
        let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(now)
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        info!(user_id = %id, role = %role, "Updated user role");
        self.find_by_id(id).await
    }
}

#[async_trait]
impl Repository<User> for UserRepository {
    async fn save(&self, user: &User) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, email_verified, image, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.email_verified)
        .bind(&user.image)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(self.pool_manager.pool())
        .await?;

        info!(user_id = %user.id, email = %user.email, role = %user.role, "Saved user");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        row.map(User::try_from).transpose()
    }

    /// Newest accounts first.
    async fn find_all(&self) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(self.pool_manager.pool())
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
