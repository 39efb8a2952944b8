//! Messaging counterparties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A counterparty, resolved by phone number on SMS/WhatsApp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}
