//! Raw row mappings and their conversion into domain types.
//!
//! Enums are stored as text; a value that fails to parse surfaces as [`StorageError::Decode`].

use chrono::{DateTime, Utc};
use inbox_core::{
    Contact, Message, MessageWithUser, Note, NoteWithAuthor, Thread, ThreadWithContact, User,
    UserSummary,
};

use crate::error::StorageError;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: String,
    pub thread_id: String,
    pub user_id: Option<String>,
    pub channel: String,
    pub direction: String,
    pub status: String,
    pub content: String,
    pub from_address: String,
    pub to_address: String,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl TryFrom<MessageRow> for Message {
    type Error = StorageError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: row.id,
            thread_id: row.thread_id,
            user_id: row.user_id,
            channel: row.channel.parse()?,
            direction: row.direction.parse()?,
            status: row.status.parse()?,
            content: row.content,
            from_address: row.from_address,
            to_address: row.to_address,
            external_id: row.external_id,
            created_at: row.created_at,
            sent_at: row.sent_at,
            scheduled_at: row.scheduled_at,
        })
    }
}

/// `messages m LEFT JOIN users u` with the user columns aliased `u_*`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageUserRow {
    #[sqlx(flatten)]
    pub message: MessageRow,
    pub u_id: Option<String>,
    pub u_first_name: Option<String>,
    pub u_last_name: Option<String>,
    pub u_email: Option<String>,
    pub u_image: Option<String>,
}

impl TryFrom<MessageUserRow> for MessageWithUser {
    type Error = StorageError;

    fn try_from(row: MessageUserRow) -> Result<Self, Self::Error> {
        let user = match (row.u_id, row.u_first_name, row.u_last_name, row.u_email) {
            (Some(id), Some(first_name), Some(last_name), Some(email)) => Some(UserSummary {
                id,
                first_name,
                last_name,
                email,
                image: row.u_image,
            }),
            _ => None,
        };
        Ok(MessageWithUser {
            message: row.message.try_into()?,
            user,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ContactRow {
    pub id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            phone: row.phone,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ThreadRow {
    pub id: String,
    pub contact_id: String,
    pub last_activity: DateTime<Utc>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<ThreadRow> for Thread {
    fn from(row: ThreadRow) -> Self {
        Thread {
            id: row.id,
            contact_id: row.contact_id,
            last_activity: row.last_activity,
            unread_count: row.unread_count,
            created_at: row.created_at,
        }
    }
}

/// `threads t JOIN contacts c` with the contact columns aliased `c_*`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ThreadContactRow {
    #[sqlx(flatten)]
    pub thread: ThreadRow,
    pub c_phone: Option<String>,
    pub c_email: Option<String>,
    pub c_first_name: Option<String>,
    pub c_last_name: Option<String>,
    pub c_created_at: DateTime<Utc>,
}

impl From<ThreadContactRow> for ThreadWithContact {
    fn from(row: ThreadContactRow) -> Self {
        let contact = Contact {
            id: row.thread.contact_id.clone(),
            phone: row.c_phone,
            email: row.c_email,
            first_name: row.c_first_name,
            last_name: row.c_last_name,
            created_at: row.c_created_at,
        };
        ThreadWithContact {
            thread: row.thread.into(),
            contact,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub email_verified: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StorageError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role.parse()?,
            email_verified: row.email_verified,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct NoteRow {
    pub id: String,
    pub contact_id: String,
    pub user_id: String,
    pub content: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Note {
            id: row.id,
            contact_id: row.contact_id,
            user_id: row.user_id,
            content: row.content,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `notes n JOIN users u` with the author columns aliased `u_*`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct NoteAuthorRow {
    #[sqlx(flatten)]
    pub note: NoteRow,
    pub u_first_name: String,
    pub u_last_name: String,
    pub u_email: String,
    pub u_image: Option<String>,
}

impl From<NoteAuthorRow> for NoteWithAuthor {
    fn from(row: NoteAuthorRow) -> Self {
        let user = UserSummary {
            id: row.note.user_id.clone(),
            first_name: row.u_first_name,
            last_name: row.u_last_name,
            email: row.u_email,
            image: row.u_image,
        };
        NoteWithAuthor {
            note: row.note.into(),
            user,
        }
    }
}
