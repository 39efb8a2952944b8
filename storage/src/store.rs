//! One handle over every repository, sharing a single pool.

use tracing::info;

use crate::contact_repo::ContactRepository;
use crate::error::StorageResult;
use crate::message_repo::MessageRepository;
use crate::models::InboxStats;
use crate::note_repo::NoteRepository;
use crate::schema::init_schema;
use crate::sqlite_pool::SqlitePoolManager;
use crate::thread_repo::ThreadRepository;
use crate::user_repo::UserRepository;

#[derive(Clone)]
pub struct Store {
    pub contacts: ContactRepository,
    pub threads: ThreadRepository,
    pub messages: MessageRepository,
    pub notes: NoteRepository,
    pub users: UserRepository,
}

impl Store {
    /// Connects to `database_url` and creates the schema if needed.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        init_schema(pool_manager.pool()).await?;
        info!(database_url = %database_url, "Store ready");
        Ok(Self::from_pool(pool_manager))
    }

    pub fn from_pool(pool_manager: SqlitePoolManager) -> Self {
        Self {
            contacts: ContactRepository::new(pool_manager.clone()),
            threads: ThreadRepository::new(pool_manager.clone()),
            messages: MessageRepository::new(pool_manager.clone()),
            notes: NoteRepository::new(pool_manager.clone()),
            users: UserRepository::new(pool_manager),
        }
    }

    /// Dashboard counters: all messages, and unread messages summed over threads.
    pub async fn inbox_stats(&self) -> StorageResult<InboxStats> {
        Ok(InboxStats {
            total_messages: self.messages.count().await?,
            total_unread: self.threads.total_unread().await?,
        })
    }
}
