//! Outbound messaging transport abstraction.
//!
//! [`MessagingTransport`] is provider-agnostic; [`crate::twilio::TwilioTransport`] implements it over
//! the Twilio REST API. Engines derive the sender address with [`SenderNumbers`] and hand a complete
//! [`OutboundRequest`] to the transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportResult;
use crate::types::Channel;

/// Channel marker the provider puts in front of WhatsApp addresses.
pub const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Removes a leading `whatsapp:` marker if present.
pub fn strip_whatsapp_prefix(address: &str) -> &str {
    address.strip_prefix(WHATSAPP_PREFIX).unwrap_or(address)
}

/// Adds the `whatsapp:` marker, never doubling it.
pub fn with_whatsapp_prefix(address: &str) -> String {
    format!("{}{}", WHATSAPP_PREFIX, strip_whatsapp_prefix(address))
}

pub fn has_whatsapp_prefix(address: &str) -> bool {
    address.starts_with(WHATSAPP_PREFIX)
}

/// Configured sender numbers. WhatsApp falls back to the SMS number when not set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderNumbers {
    pub sms: String,
    pub whatsapp: Option<String>,
}

impl SenderNumbers {
    pub fn new(sms: impl Into<String>, whatsapp: Option<String>) -> Self {
        Self {
            sms: sms.into(),
            whatsapp: whatsapp.filter(|w| !w.trim().is_empty()),
        }
    }

    /// The "from" address for a channel: the SMS number as-is, or the WhatsApp-capable number
    /// carrying the channel marker. May be empty (or just the marker) when nothing is configured;
    /// the transport rejects that.
    pub fn from_address(&self, channel: Channel) -> String {
        match channel {
            Channel::Whatsapp => {
                let number = self.whatsapp.as_deref().unwrap_or(&self.sms);
                with_whatsapp_prefix(number)
            }
            _ => self.sms.clone(),
        }
    }
}

/// A fully addressed send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub channel: Channel,
    pub from: String,
    pub to: String,
    pub body: String,
}

/// What the provider returns for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportReceipt {
    pub external_id: String,
    pub status: String,
}

/// Sends SMS/WhatsApp messages. Implementations map to a provider (e.g. Twilio).
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Sends one message; returns the provider id and initial status, or a transport error.
    async fn send(&self, request: &OutboundRequest) -> TransportResult<TransportReceipt>;
}
