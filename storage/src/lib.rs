//! Storage crate: SQLite persistence for the inbox.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – NewMessage, InboxStats and row mappings
//! - [`repository`] – Repository trait
//! - [`contact_repo`], [`thread_repo`], [`message_repo`], [`note_repo`], [`user_repo`] – one repository per table
//! - [`sqlite_pool`] – SqlitePoolManager
//! - [`store`] – Store bundling all repositories over one pool

mod contact_repo;
mod error;
mod message_repo;
mod models;
mod note_repo;
mod repository;
mod schema;
mod sqlite_pool;
mod store;
mod thread_repo;
mod user_repo;


pub use contact_repo::ContactRepository;
pub use error::{StorageError, StorageResult};
pub use message_repo::MessageRepository;
pub use models::{InboxStats, NewMessage};
pub use note_repo::NoteRepository;
pub use repository::Repository;
pub use schema::init_schema;
pub use sqlite_pool::SqlitePoolManager;
pub use store::Store;
pub use thread_repo::ThreadRepository;
pub use user_repo::UserRepository;
