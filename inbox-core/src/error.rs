use std::time::Duration;

use thiserror::Error;

use crate::types::Channel;

/// Failures of the outbound messaging transport. Any of these leaves the message FAILED.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport not configured: {0}")]
    NotConfigured(String),

    #[error("Unsupported channel: {0}")]
    UnsupportedChannel(Channel),

    #[error("Transport request failed: {0}")]
    Request(String),

    #[error("Transport timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider rejected message (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

pub type TransportResult<T> = std::result::Result<T, TransportError>;
