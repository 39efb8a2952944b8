//! Collaborative notes on contacts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;

/// Free-text annotation on a contact. Only the author may change or delete it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub contact_id: String,
    pub user_id: String,
    pub content: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn is_authored_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Private notes are only visible to their author.
    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.is_public || self.is_authored_by(user_id)
    }
}

/// Note with its author attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteWithAuthor {
    #[serde(flatten)]
    pub note: Note,
    pub user: UserSummary,
}
