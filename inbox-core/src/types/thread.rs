//! Conversation threads: one per contact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contact::Contact;
use super::message::Message;

/// The single conversation with one contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub contact_id: String,
    pub last_activity: DateTime<Utc>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Thread joined with its contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadWithContact {
    #[serde(flatten)]
    pub thread: Thread,
    pub contact: Contact,
}

/// Inbox row: thread, contact and the most recent message if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadSummary {
    #[serde(flatten)]
    pub thread: Thread,
    pub contact: Contact,
    pub latest_message: Option<Message>,
}
