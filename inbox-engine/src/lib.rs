//! # inbox-engine
//!
//! Business operations of the unified inbox, over [`storage::Store`] and a
//! [`inbox_core::MessagingTransport`]:
//!
//! - [`DispatchEngine`] – send or schedule an outbound message
//! - [`ScheduledSweeper`] – deliver scheduled messages that are due
//! - [`WebhookIngestor`] – fold provider callbacks into contacts, threads and messages
//! - [`InboxService`], [`NoteService`], [`UserService`] – thread views, notes, users

pub mod access;
pub mod dispatch;
pub mod error;
pub mod inbox;
pub mod ingest;
pub mod notes;
pub mod route;
pub mod sweeper;
pub mod users;

pub use access::{require_admin, require_sender};
pub use dispatch::{DispatchEngine, SendRequest};
pub use error::{EngineError, IngestError, Result};
pub use inbox::InboxService;
pub use ingest::{classify_channel, normalize_phone, IngestOutcome, WebhookIngestor, WebhookPayload};
pub use notes::{NoteChanges, NoteService};
pub use route::{OutboundRoute, DEFAULT_SEND_TIMEOUT};
pub use sweeper::{ScheduledSweeper, SweepReport, CLAIM_LEASE_SECS, SWEEP_BATCH_LIMIT};
pub use users::{NewUserRequest, UserService};
