//! Domain types shared by storage, engine, analytics and the HTTP surface.

pub mod channel;
pub mod contact;
pub mod message;
pub mod note;
pub mod thread;
pub mod user;

pub use channel::{Channel, Direction, MessageStatus, ParseEnumError};
pub use contact::Contact;
pub use message::{Message, MessageWithUser};
pub use note::{Note, NoteWithAuthor};
pub use thread::{Thread, ThreadSummary, ThreadWithContact};
pub use user::{User, UserRole, UserSummary};
