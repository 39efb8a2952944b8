use inbox_core::{Channel, Message, TransportError};
use storage::StorageError;
use thiserror::Error;

/// Errors from user-facing engine operations. Each maps onto one HTTP status at the edge.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unsupported channel: {0}")]
    UnsupportedChannel(Channel),

    /// The transport refused or failed; the FAILED message is already persisted.
    #[error("{source}")]
    DispatchFailed {
        message: Box<Message>,
        #[source]
        source: TransportError,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from webhook ingestion. Always answered with a 500 so the provider redelivers.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Malformed webhook payload: {0}")]
    Malformed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
