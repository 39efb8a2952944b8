//! Message enums: channel, direction, status.
//!
//! Stored as their upper-case names (`"SMS"`, `"INBOUND"`, `"SCHEDULED"`) and serialized the same way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when a stored or submitted enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Transport medium of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    Sms,
    Whatsapp,
    Email,
    Twitter,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "SMS",
            Channel::Whatsapp => "WHATSAPP",
            Channel::Email => "EMAIL",
            Channel::Twitter => "TWITTER",
        }
    }

    /// Only SMS and WhatsApp have an outbound transport.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Channel::Sms | Channel::Whatsapp)
    }
}

impl FromStr for Channel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SMS" => Ok(Channel::Sms),
            "WHATSAPP" => Ok(Channel::Whatsapp),
            "EMAIL" => Ok(Channel::Email),
            "TWITTER" => Ok(Channel::Twitter),
            other => Err(ParseEnumError::new("channel", other)),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a message relative to the inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "INBOUND",
            Direction::Outbound => "OUTBOUND",
        }
    }
}

impl FromStr for Direction {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INBOUND" => Ok(Direction::Inbound),
            "OUTBOUND" => Ok(Direction::Outbound),
            other => Err(ParseEnumError::new("direction", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a message.
///
/// `Pending` doubles as the in-flight marker a sweeper sets when it claims a scheduled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Pending,
    Scheduled,
    Sent,
    Delivered,
    Read,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "PENDING",
            MessageStatus::Scheduled => "SCHEDULED",
            MessageStatus::Sent => "SENT",
            MessageStatus::Delivered => "DELIVERED",
            MessageStatus::Read => "READ",
            MessageStatus::Failed => "FAILED",
        }
    }

    /// SENT, DELIVERED and READ count as successful deliveries.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            MessageStatus::Sent | MessageStatus::Delivered | MessageStatus::Read
        )
    }

    /// Maps a provider status string onto a status. Unknown values mean the provider accepted it.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "delivered" => MessageStatus::Delivered,
            "read" => MessageStatus::Read,
            "failed" => MessageStatus::Failed,
            _ => MessageStatus::Sent,
        }
    }

    /// Whether a provider callback may move a message from `self` to `next`.
    ///
    /// Delivery receipts only move forward (SENT -> DELIVERED -> READ); a failure report
    /// applies to messages that were accepted but not yet confirmed delivered.
    pub fn can_advance_to(&self, next: MessageStatus) -> bool {
        use MessageStatus::*;
        match (self, next) {
            (Sent, Delivered) | (Sent, Read) | (Delivered, Read) => true,
            (Pending, Sent) | (Pending, Delivered) | (Pending, Read) => true,
            (Sent, Failed) | (Pending, Failed) => true,
            _ => false,
        }
    }
}

impl FromStr for MessageStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(MessageStatus::Pending),
            "SCHEDULED" => Ok(MessageStatus::Scheduled),
            "SENT" => Ok(MessageStatus::Sent),
            "DELIVERED" => Ok(MessageStatus::Delivered),
            "READ" => Ok(MessageStatus::Read),
            "FAILED" => Ok(MessageStatus::Failed),
            other => Err(ParseEnumError::new("message status", other)),
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_roundtrip_names() {
        for c in [Channel::Sms, Channel::Whatsapp, Channel::Email, Channel::Twitter] {
            assert_eq!(c.as_str().parse::<Channel>().unwrap(), c);
        }
        assert!("sms".parse::<Channel>().is_err());
    }

    #[test]
    fn test_channel_dispatchable() {
        assert!(Channel::Sms.is_dispatchable());
        assert!(Channel::Whatsapp.is_dispatchable());
        assert!(!Channel::Email.is_dispatchable());
        assert!(!Channel::Twitter.is_dispatchable());
    }

    #[test]
    fn test_status_from_provider() {
        assert_eq!(MessageStatus::from_provider("delivered"), MessageStatus::Delivered);
        assert_eq!(MessageStatus::from_provider("read"), MessageStatus::Read);
        assert_eq!(MessageStatus::from_provider("failed"), MessageStatus::Failed);
        assert_eq!(MessageStatus::from_provider("received"), MessageStatus::Sent);
        assert_eq!(MessageStatus::from_provider(""), MessageStatus::Sent);
    }

    #[test]
    fn test_status_advances_forward_only() {
        assert!(MessageStatus::Sent.can_advance_to(MessageStatus::Delivered));
        assert!(MessageStatus::Delivered.can_advance_to(MessageStatus::Read));
        assert!(!MessageStatus::Read.can_advance_to(MessageStatus::Delivered));
        assert!(!MessageStatus::Delivered.can_advance_to(MessageStatus::Sent));
        assert!(!MessageStatus::Failed.can_advance_to(MessageStatus::Sent));
        assert!(!MessageStatus::Scheduled.can_advance_to(MessageStatus::Sent));
    }

    #[test]
    fn test_serde_uses_upper_case() {
        let json = serde_json::to_string(&MessageStatus::Scheduled).unwrap();
        assert_eq!(json, "\"SCHEDULED\"");
        let c: Channel = serde_json::from_str("\"WHATSAPP\"").unwrap();
        assert_eq!(c, Channel::Whatsapp);
    }
}
