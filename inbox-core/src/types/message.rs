//! A single unit of communication inside a thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::channel::{Channel, Direction, MessageStatus};
use super::user::UserSummary;

/// Persisted message. `user_id` is only ever set on outbound messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub user_id: Option<String>,
    pub channel: Channel,
    pub direction: Direction,
    pub status: MessageStatus,
    pub content: String,
    #[serde(rename = "from")]
    pub from_address: String,
    #[serde(rename = "to")]
    pub to_address: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl Message {
    pub fn is_inbound(&self) -> bool {
        self.direction == Direction::Inbound
    }

    /// An outbound message written by a person (not an automated send).
    pub fn is_user_reply(&self) -> bool {
        self.direction == Direction::Outbound && self.user_id.is_some()
    }
}

/// Message with the sending user attached, when there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageWithUser {
    #[serde(flatten)]
    pub message: Message,
    pub user: Option<UserSummary>,
}
