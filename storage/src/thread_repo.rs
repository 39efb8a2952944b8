//! Thread repository: one thread per contact, bookkeeping updates and inbox listing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use inbox_core::{Message, Thread, ThreadSummary, ThreadWithContact};
use tracing::info;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::models::rows::{MessageRow, ThreadContactRow, ThreadRow};
use crate::sqlite_pool::SqlitePoolManager;

const THREAD_WITH_CONTACT_SQL: &str = r#"
    SELECT t.*, c.phone AS c_phone, c.email AS c_email, c.first_name AS c_first_name,
           c.last_name AS c_last_name, c.created_at AS c_created_at
    FROM threads t
    JOIN contacts c ON c.id = t.contact_id
"#;

#[derive(Clone)]
pub struct ThreadRepository {
    pool_manager: SqlitePoolManager,
}

impl ThreadRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn find_by_id(&self, id: &str) -> StorageResult<Option<Thread>> {
        let row = sqlx::query_as::<_, ThreadRow>("SELECT * FROM threads WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(row.map(Thread::from))
    }

    pub async fn find_by_contact(&self, contact_id: &str) -> StorageResult<Option<Thread>> {
        let row = sqlx::query_as::<_, ThreadRow>("SELECT * FROM threads WHERE contact_id = ?")
            .bind(contact_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(row.map(Thread::from))
    }

    pub async fn find_with_contact(&self, id: &str) -> StorageResult<Option<ThreadWithContact>> {
        let sql = format!("{} WHERE t.id = ?", THREAD_WITH_CONTACT_SQL);
        let row = sqlx::query_as::<_, ThreadContactRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(row.map(ThreadWithContact::from))
    }

    /// Returns the thread for a contact, creating it if missing. The boolean is true when created.
    pub async fn get_or_create_for_contact(
        &self,
        contact_id: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<(Thread, bool)> {
        let pool = self.pool_manager.pool();

        let result = sqlx::query(
            r#"
            INSERT INTO threads (id, contact_id, last_activity, unread_count, created_at)
            VALUES (?, ?, ?, 0, ?)
            ON CONFLICT(contact_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(contact_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let row = sqlx::query_as::<_, ThreadRow>("SELECT * FROM threads WHERE contact_id = ?")
            .bind(contact_id)
            .fetch_one(pool)
            .await?;

        let created = result.rows_affected() == 1;
        if created {
            info!(thread_id = %row.id, contact_id = %contact_id, "Created thread");
        }
        Ok((row.into(), created))
    }

    /// Resets the unread counter when a user opens the thread.
    pub async fn mark_read(&self, id: &str) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE threads SET unread_count = 0 WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn total_unread(&self) -> StorageResult<i64> {
        let total: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(unread_count), 0) FROM threads WHERE unread_count > 0",
        )
        .fetch_one(self.pool_manager.pool())
        .await?;
        Ok(total.0)
    }

    /// All threads, most recently active first, each with contact and latest message.
    pub async fn list_summaries(&self) -> StorageResult<Vec<ThreadSummary>> {
        let pool = self.pool_manager.pool();

        let sql = format!("{} ORDER BY t.last_activity DESC", THREAD_WITH_CONTACT_SQL);
        let threads = sqlx::query_as::<_, ThreadContactRow>(&sql)
            .fetch_all(pool)
            .await?;

        let latest_rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT m.* FROM messages m
            WHERE m.id IN (
                SELECT (
                    SELECT id FROM messages
                    WHERE thread_id = t.id
                    ORDER BY created_at DESC, rowid DESC
                    LIMIT 1
                )
                FROM threads t
            )
            "#,
        )
        .fetch_all(pool)
        .await?;

        let mut latest: HashMap<String, Message> = HashMap::new();
        for row in latest_rows {
            let message = Message::try_from(row)?;
            latest.insert(message.thread_id.clone(), message);
        }

        let summaries = threads
            .into_iter()
            .map(|row| {
                let ThreadWithContact { thread, contact } = row.into();
                let latest_message = latest.remove(&thread.id);
                ThreadSummary {
                    thread,
                    contact,
                    latest_message,
                }
            })
            .collect::<Vec<_>>();

        info!("Retrieved {} threads", summaries.len());
        Ok(summaries)
    }
}
