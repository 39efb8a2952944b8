//! Contact repository: lookup and race-free find-or-create by phone number.

use chrono::{DateTime, Utc};
use inbox_core::Contact;
use tracing::info;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::models::rows::ContactRow;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct ContactRepository {
    pool_manager: SqlitePoolManager,
}

impl ContactRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn find_by_id(&self, id: &str) -> StorageResult<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(row.map(Contact::from))
    }

    pub async fn find_by_phone(&self, phone: &str) -> StorageResult<Option<Contact>> {
        let row = sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts WHERE phone = ?")
            .bind(phone)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(row.map(Contact::from))
    }

    /// Returns the contact for `phone`, creating it if unseen. The boolean is true when created.
    ///
    /// The insert is conditional on the unique phone index, so concurrent first contacts from the
    /// same number converge on one row.
    pub async fn get_or_create_by_phone(
        &self,
        phone: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<(Contact, bool)> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query(
            "INSERT INTO contacts (id, phone, created_at) VALUES (?, ?, ?) ON CONFLICT(phone) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(phone)
        .bind(now)
        .execute(pool)
        .await?;

        let row = sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts WHERE phone = ?")
            .bind(phone)
            .fetch_one(pool)
            .await?;

        let created = result.rows_affected() == 1;
        if created {
            info!(contact_id = %row.id, phone = %phone, "Created contact");
        }
        Ok((row.into(), created))
    }
}
