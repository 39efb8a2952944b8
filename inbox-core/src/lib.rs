//! # inbox-core
//!
//! Core types and traits for the unified inbox: contacts, threads, messages, notes and users;
//! the [`MessagingTransport`] abstraction with its Twilio implementation; tracing initialisation.
//! Storage-agnostic; used by storage, inbox-engine, analytics and inbox-server.

pub mod error;
pub mod logger;
pub mod transport;
pub mod twilio;
pub mod types;

pub use error::{TransportError, TransportResult};
pub use logger::init_tracing;
pub use transport::{
    has_whatsapp_prefix, strip_whatsapp_prefix, with_whatsapp_prefix, MessagingTransport,
    OutboundRequest, SenderNumbers, TransportReceipt, WHATSAPP_PREFIX,
};
pub use twilio::{mask_token, TwilioConfig, TwilioTransport, DEFAULT_TWILIO_API_URL};
pub use types::{
    Channel, Contact, Direction, Message, MessageStatus, MessageWithUser, Note, NoteWithAuthor,
    ParseEnumError, Thread, ThreadSummary, ThreadWithContact, User, UserRole, UserSummary,
};
