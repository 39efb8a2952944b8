//! Persistence models: row mappings, insert payloads and aggregate stats.

mod inbox_stats;
mod new_message;
pub(crate) mod rows;

pub use inbox_stats::InboxStats;
pub use new_message::NewMessage;
