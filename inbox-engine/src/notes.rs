//! Collaborative notes on contacts. Anyone signed in may write; only the author may change a note.

use chrono::{DateTime, Utc};
use inbox_core::{Note, NoteWithAuthor, User};
use serde::{Deserialize, Serialize};
use storage::{Repository, Store};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, Result};

/// Partial update; absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteChanges {
    pub content: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Clone)]
pub struct NoteService {
    store: Store,
}

impl NoteService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Notes on a contact visible to `viewer`, newest first.
    pub async fn list(&self, contact_id: &str, viewer: &User) -> Result<Vec<NoteWithAuthor>> {
        Ok(self
            .store
            .notes
            .list_visible_for_contact(contact_id, &viewer.id)
            .await?)
    }

    pub async fn create(
        &self,
        contact_id: &str,
        author: &User,
        content: &str,
        is_public: Option<bool>,
    ) -> Result<NoteWithAuthor> {
        self.create_at(contact_id, author, content, is_public, Utc::now())
            .await
    }

    pub async fn create_at(
        &self,
        contact_id: &str,
        author: &User,
        content: &str,
        is_public: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<NoteWithAuthor> {
        let content = required_content(content)?;
        if self.store.contacts.find_by_id(contact_id).await?.is_none() {
            return Err(EngineError::NotFound("Contact not found".to_string()));
        }

        let note = Note {
            id: Uuid::new_v4().to_string(),
            contact_id: contact_id.to_string(),
            user_id: author.id.clone(),
            content,
            is_public: is_public.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.store.notes.save(&note).await?;

        Ok(NoteWithAuthor {
            note,
            user: author.summary(),
        })
    }

    pub async fn update(
        &self,
        note_id: &str,
        actor: &User,
        changes: NoteChanges,
    ) -> Result<NoteWithAuthor> {
        let mut note = self.authored_note(note_id, actor, "edit").await?;

        if let Some(content) = changes.content.as_deref() {
            note.content = required_content(content)?;
        }
        if let Some(is_public) = changes.is_public {
            note.is_public = is_public;
        }
        note.updated_at = Utc::now();

        self.store.notes.update(&note).await?;
        info!(note_id = %note.id, user_id = %actor.id, "Note updated");

        Ok(NoteWithAuthor {
            note,
            user: actor.summary(),
        })
    }

    pub async fn delete(&self, note_id: &str, actor: &User) -> Result<()> {
        let note = self.authored_note(note_id, actor, "delete").await?;
        self.store.notes.delete(&note.id).await?;
        info!(note_id = %note.id, user_id = %actor.id, "Note deleted");
        Ok(())
    }

    async fn authored_note(&self, note_id: &str, actor: &User, verb: &str) -> Result<Note> {
        let note = self
            .store
            .notes
            .find_by_id(note_id)
            .await?
            .ok_or_else(|| EngineError::NotFound("Note not found".to_string()))?;
        if !note.is_authored_by(&actor.id) {
            return Err(EngineError::Forbidden(format!(
                "You can only {} your own notes",
                verb
            )));
        }
        Ok(note)
    }
}

fn required_content(content: &str) -> Result<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("Content is required".to_string()));
    }
    Ok(trimmed.to_string())
}
