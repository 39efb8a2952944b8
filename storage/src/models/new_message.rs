//! Insert payload for the `messages` table.
//!
//! Used by MessageRepository insert paths; the id is generated up front so callers can log it.

use chrono::{DateTime, Utc};
use inbox_core::{Channel, Direction, Message, MessageStatus};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub id: String,
    pub thread_id: String,
    pub user_id: Option<String>,
    pub channel: Channel,
    pub direction: Direction,
    pub status: MessageStatus,
    pub content: String,
    pub from_address: String,
    pub to_address: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl NewMessage {
    /// Outbound message written by `user_id`; status and timestamps are set with the builder methods.
    pub fn outbound(
        thread_id: &str,
        user_id: &str,
        channel: Channel,
        content: &str,
        from_address: &str,
        to_address: &str,
        status: MessageStatus,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            user_id: Some(user_id.to_string()),
            channel,
            direction: Direction::Outbound,
            status,
            content: content.to_string(),
            from_address: from_address.to_string(),
            to_address: to_address.to_string(),
            external_id: None,
            created_at: Utc::now(),
            sent_at: None,
            scheduled_at: None,
        }
    }

    /// Inbound message from a contact. Never carries a user.
    pub fn inbound(
        thread_id: &str,
        channel: Channel,
        status: MessageStatus,
        content: &str,
        from_address: &str,
        to_address: &str,
        external_id: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            thread_id: thread_id.to_string(),
            user_id: None,
            channel,
            direction: Direction::Inbound,
            status,
            content: content.to_string(),
            from_address: from_address.to_string(),
            to_address: to_address.to_string(),
            external_id: Some(external_id.to_string()),
            created_at: Utc::now(),
            sent_at: None,
            scheduled_at: None,
        }
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn sent(mut self, external_id: Option<String>, at: DateTime<Utc>) -> Self {
        if external_id.is_some() {
            self.external_id = external_id;
        }
        self.sent_at = Some(at);
        self
    }

    pub fn scheduled_for(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// The message as it reads back after insertion.
    pub fn into_message(self) -> Message {
        Message {
            id: self.id,
            thread_id: self.thread_id,
            user_id: self.user_id,
            channel: self.channel,
            direction: self.direction,
            status: self.status,
            content: self.content,
            from_address: self.from_address,
            to_address: self.to_address,
            external_id: self.external_id,
            created_at: self.created_at,
            sent_at: self.sent_at,
            scheduled_at: self.scheduled_at,
        }
    }
}
