//! Inbox views: thread list, thread detail, reading a thread, starting a conversation.

use chrono::{DateTime, Utc};
use inbox_core::{MessageWithUser, ThreadSummary, ThreadWithContact, User};
use storage::{InboxStats, Store};
use tracing::info;

use crate::access::require_sender;
use crate::error::{EngineError, Result};
use crate::ingest::normalize_phone;

#[derive(Clone)]
pub struct InboxService {
    store: Store,
}

impl InboxService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Every thread, most recent activity first, with its contact and latest message.
    pub async fn list_threads(&self) -> Result<Vec<ThreadSummary>> {
        Ok(self.store.threads.list_summaries().await?)
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<ThreadWithContact> {
        self.store
            .threads
            .find_with_contact(thread_id)
            .await?
            .ok_or_else(thread_not_found)
    }

    /// Thread history, oldest first. Opening a thread clears its unread count.
    pub async fn read_thread(&self, thread_id: &str) -> Result<Vec<MessageWithUser>> {
        if !self.store.threads.mark_read(thread_id).await? {
            return Err(thread_not_found());
        }
        let messages = self.store.messages.list_by_thread(thread_id).await?;
        info!(thread_id = %thread_id, count = messages.len(), "Thread read");
        Ok(messages)
    }

    pub async fn open_thread(&self, phone: &str, acting_user: &User) -> Result<ThreadWithContact> {
        self.open_thread_at(phone, acting_user, Utc::now()).await
    }

    /// Finds or creates the contact and thread for `phone` so a user can write first.
    pub async fn open_thread_at(
        &self,
        phone: &str,
        acting_user: &User,
        now: DateTime<Utc>,
    ) -> Result<ThreadWithContact> {
        require_sender(acting_user)?;
        if phone.trim().is_empty() {
            return Err(EngineError::Validation("Phone number is required".to_string()));
        }

        let phone = normalize_phone(phone);
        let (contact, _) = self.store.contacts.get_or_create_by_phone(&phone, now).await?;
        let (thread, created) = self
            .store
            .threads
            .get_or_create_for_contact(&contact.id, now)
            .await?;
        info!(thread_id = %thread.id, created, user_id = %acting_user.id, "Thread opened");
        Ok(ThreadWithContact { thread, contact })
    }

    pub async fn dashboard_stats(&self) -> Result<InboxStats> {
        Ok(self.store.inbox_stats().await?)
    }
}

fn thread_not_found() -> EngineError {
    EngineError::NotFound("Thread not found".to_string())
}
