//! Message repository: persistence and queries for messages.
//!
//! Writes that also change thread bookkeeping (last activity, unread count) run in one transaction
//! so a message never lands without its thread update or vice versa.

use chrono::{DateTime, Utc};
use inbox_core::{Message, MessageStatus, MessageWithUser};
use sqlx::sqlite::SqliteArguments;
use sqlx::Sqlite;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};
use crate::models::rows::{MessageRow, MessageUserRow};
use crate::models::NewMessage;
use crate::sqlite_pool::SqlitePoolManager;

const INSERT_SQL: &str = r#"
    INSERT INTO messages (id, thread_id, user_id, channel, direction, status, content,
                          from_address, to_address, external_id, created_at, sent_at, scheduled_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const INSERT_IF_NEW_SQL: &str = r#"
    INSERT INTO messages (id, thread_id, user_id, channel, direction, status, content,
                          from_address, to_address, external_id, created_at, sent_at, scheduled_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(external_id) DO NOTHING
"#;

const MESSAGE_WITH_USER_SQL: &str = r#"
    SELECT m.*, u.id AS u_id, u.first_name AS u_first_name, u.last_name AS u_last_name,
           u.email AS u_email, u.image AS u_image
    FROM messages m
    LEFT JOIN users u ON u.id = m.user_id
"#;

fn bind_insert<'q>(
    sql: &'q str,
    m: &'q NewMessage,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    sqlx::query(sql)
        .bind(&m.id)
        .bind(&m.thread_id)
        .bind(&m.user_id)
        .bind(m.channel.as_str())
        .bind(m.direction.as_str())
        .bind(m.status.as_str())
        .bind(&m.content)
        .bind(&m.from_address)
        .bind(&m.to_address)
        .bind(&m.external_id)
        .bind(m.created_at)
        .bind(m.sent_at)
        .bind(m.scheduled_at)
}

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Inserts a message without touching its thread (failed sends).
    pub async fn insert(&self, message: &NewMessage) -> StorageResult<Message> {
        bind_insert(INSERT_SQL, message)
            .execute(self.pool_manager.pool())
            .await?;

        info!(
            message_id = %message.id,
            thread_id = %message.thread_id,
            status = %message.status,
            "Saved message"
        );
        Ok(message.clone().into_message())
    }

    /// Inserts a message and bumps its thread's last activity to `at`, atomically.
    pub async fn insert_and_touch_thread(
        &self,
        message: &NewMessage,
        at: DateTime<Utc>,
    ) -> StorageResult<Message> {
        let mut tx = self.pool_manager.pool().begin().await?;

        bind_insert(INSERT_SQL, message).execute(&mut *tx).await?;

        let touched = sqlx::query("UPDATE threads SET last_activity = ? WHERE id = ?")
            .bind(at)
            .bind(&message.thread_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() != 1 {
            return Err(StorageError::NotFound(format!("thread {}", message.thread_id)));
        }

        tx.commit().await?;

        info!(
            message_id = %message.id,
            thread_id = %message.thread_id,
            status = %message.status,
            "Saved message and touched thread"
        );
        Ok(message.clone().into_message())
    }

    /// Inserts an inbound message and bumps last activity plus unread count, atomically.
    ///
    /// Returns `None` without side effects when a message with the same external id already exists.
    pub async fn insert_inbound(
        &self,
        message: &NewMessage,
        at: DateTime<Utc>,
    ) -> StorageResult<Option<Message>> {
        let mut tx = self.pool_manager.pool().begin().await?;

        let inserted = bind_insert(INSERT_IF_NEW_SQL, message)
            .execute(&mut *tx)
            .await?;
        if inserted.rows_affected() == 0 {
            debug!(external_id = ?message.external_id, "Duplicate inbound message ignored");
            return Ok(None);
        }

        let touched = sqlx::query(
            "UPDATE threads SET last_activity = ?, unread_count = unread_count + 1 WHERE id = ?",
        )
        .bind(at)
        .bind(&message.thread_id)
        .execute(&mut *tx)
        .await?;
        if touched.rows_affected() != 1 {
            return Err(StorageError::NotFound(format!("thread {}", message.thread_id)));
        }

        tx.commit().await?;

        info!(
            message_id = %message.id,
            thread_id = %message.thread_id,
            external_id = ?message.external_id,
            "Saved inbound message"
        );
        Ok(Some(message.clone().into_message()))
    }

    pub async fn find_by_id(&self, id: &str) -> StorageResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        row.map(Message::try_from).transpose()
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> StorageResult<Option<Message>> {
        let row = sqlx::query_as::<_, MessageRow>("SELECT * FROM messages WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        row.map(Message::try_from).transpose()
    }

    /// Thread history, oldest first, with sending users attached.
    pub async fn list_by_thread(&self, thread_id: &str) -> StorageResult<Vec<MessageWithUser>> {
        let sql = format!(
            "{} WHERE m.thread_id = ? ORDER BY m.created_at ASC, m.rowid ASC",
            MESSAGE_WITH_USER_SQL
        );
        let rows = sqlx::query_as::<_, MessageUserRow>(&sql)
            .bind(thread_id)
            .fetch_all(self.pool_manager.pool())
            .await?;

        info!("Retrieved {} messages for thread {}", rows.len(), thread_id);
        rows.into_iter().map(MessageWithUser::try_from).collect()
    }

    /// Messages created in `[start, end]`, oldest first, with sending users attached.
    pub async fn list_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StorageResult<Vec<MessageWithUser>> {
        let sql = format!(
            "{} WHERE m.created_at >= ? AND m.created_at <= ? ORDER BY m.created_at ASC, m.rowid ASC",
            MESSAGE_WITH_USER_SQL
        );
        let rows = sqlx::query_as::<_, MessageUserRow>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(self.pool_manager.pool())
            .await?;

        info!("Retrieved {} messages created since {}", rows.len(), start);
        rows.into_iter().map(MessageWithUser::try_from).collect()
    }

    /// Scheduled messages due at `now`, at most `limit`.
    pub async fn find_due_scheduled(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> StorageResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT * FROM messages
            WHERE status = ? AND scheduled_at IS NOT NULL AND scheduled_at <= ?
            ORDER BY scheduled_at ASC
            LIMIT ?
            "#,
        )
        .bind(MessageStatus::Scheduled.as_str())
        .bind(now)
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;

        rows.into_iter().map(Message::try_from).collect()
    }

    /// Claims a scheduled message for sending (SCHEDULED -> PENDING), stamping the claim time.
    ///
    /// Returns false if the message is no longer SCHEDULED, i.e. another sweeper got it first.
    pub async fn claim_scheduled(&self, id: &str, at: DateTime<Utc>) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE messages SET status = ?, claimed_at = ? WHERE id = ? AND status = ?",
        )
        .bind(MessageStatus::Pending.as_str())
        .bind(at)
        .bind(id)
        .bind(MessageStatus::Scheduled.as_str())
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Marks FAILED every claimed message still PENDING with a claim at or before `cutoff`.
    ///
    /// Unclaimed PENDING rows (immediate sends in flight) have no claim time and are left alone.
    pub async fn fail_stale_claims(&self, cutoff: DateTime<Utc>) -> StorageResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET status = ? WHERE status = ? AND claimed_at IS NOT NULL AND claimed_at <= ?",
        )
        .bind(MessageStatus::Failed.as_str())
        .bind(MessageStatus::Pending.as_str())
        .bind(cutoff)
        .execute(self.pool_manager.pool())
        .await?;

        let failed = result.rows_affected();
        if failed > 0 {
            warn!(failed, "Failed scheduled messages stuck in a stale claim");
        }
        Ok(failed)
    }

    /// Finalises a claimed message as SENT and bumps its thread, atomically.
    pub async fn complete_sent(
        &self,
        message: &Message,
        external_id: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let mut tx = self.pool_manager.pool().begin().await?;

        sqlx::query(
            "UPDATE messages SET status = ?, external_id = ?, sent_at = ? WHERE id = ?",
        )
        .bind(MessageStatus::Sent.as_str())
        .bind(external_id)
        .bind(at)
        .bind(&message.id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE threads SET last_activity = ? WHERE id = ?")
            .bind(at)
            .bind(&message.thread_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn mark_failed(&self, id: &str) -> StorageResult<()> {
        sqlx::query("UPDATE messages SET status = ? WHERE id = ?")
            .bind(MessageStatus::Failed.as_str())
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(())
    }

    /// Conditional status change: applies only while the message is still in `from`.
    pub async fn transition_status(
        &self,
        id: &str,
        from: MessageStatus,
        to: MessageStatus,
    ) -> StorageResult<bool> {
        let result = sqlx::query("UPDATE messages SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn count(&self) -> StorageResult<i64> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(total.0)
    }
}
