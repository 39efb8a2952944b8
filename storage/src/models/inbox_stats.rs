//! Aggregate counters for the dashboard.
//!
//! Returned by `Store::inbox_stats`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxStats {
    pub total_messages: i64,
    pub total_unread: i64,
}
