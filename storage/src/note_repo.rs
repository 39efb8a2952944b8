//! Note repository: collaborative notes on contacts.

use async_trait::async_trait;
use inbox_core::{Note, NoteWithAuthor};
use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::models::rows::{NoteAuthorRow, NoteRow};
use crate::repository::Repository;
use crate::sqlite_pool::SqlitePoolManager;

const NOTE_WITH_AUTHOR_SQL: &str = r#"
    SELECT n.*, u.first_name AS u_first_name, u.last_name AS u_last_name,
           u.email AS u_email, u.image AS u_image
    FROM notes n
    JOIN users u ON u.id = n.user_id
"#;

#[derive(Clone)]
pub struct NoteRepository {
    pool_manager: SqlitePoolManager,
}

impl NoteRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    /// Notes on a contact that `viewer_id` may see (public, or their own), newest first.
    pub async fn list_visible_for_contact(
        &self,
        contact_id: &str,
        viewer_id: &str,
    ) -> StorageResult<Vec<NoteWithAuthor>> {
        let sql = format!(
            "{} WHERE n.contact_id = ? AND (n.is_public = 1 OR n.user_id = ?) ORDER BY n.created_at DESC",
            NOTE_WITH_AUTHOR_SQL
        );
        let rows = sqlx::query_as::<_, NoteAuthorRow>(&sql)
            .bind(contact_id)
            .bind(viewer_id)
            .fetch_all(self.pool_manager.pool())
            .await?;

        info!("Retrieved {} notes for contact {}", rows.len(), contact_id);
        Ok(rows.into_iter().map(NoteWithAuthor::from).collect())
    }

    /// Writes content, visibility and `updated_at` back.
    pub async fn update(&self, note: &Note) -> StorageResult<bool> {
        let result = sqlx::query(
            "UPDATE notes SET content = ?, is_public = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&note.content)
        .bind(note.is_public)
        .bind(note.updated_at)
        .bind(&note.id)
        .execute(self.pool_manager.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl Repository<Note> for NoteRepository {
    async fn save(&self, note: &Note) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO notes (id, contact_id, user_id, content, is_public, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&note.id)
        .bind(&note.contact_id)
        .bind(&note.user_id)
        .bind(&note.content)
        .bind(note.is_public)
        .bind(note.created_at)
        .bind(note.updated_at)
        .execute(self.pool_manager.pool())
        .await?;

        info!(note_id = %note.id, contact_id = %note.contact_id, "Saved note");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Note>, StorageError> {
        let row = sqlx::query_as::<_, NoteRow>("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(row.map(Note::from))
    }

    async fn find_all(&self) -> Result<Vec<Note>, StorageError> {
        let rows = sqlx::query_as::<_, NoteRow>("SELECT * FROM notes ORDER BY created_at DESC")
            .fetch_all(self.pool_manager.pool())
            .await?;
        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
