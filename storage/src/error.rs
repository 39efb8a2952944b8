//! Storage error types.
//!
//! Used by repository implementations and callers of storage APIs.

use thiserror::Error;

/// Errors that can occur when using storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Corrupt row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StorageError::AlreadyExists(db.message().to_string());
            }
        }
        StorageError::Database(e.to_string())
    }
}

impl From<inbox_core::ParseEnumError> for StorageError {
    fn from(e: inbox_core::ParseEnumError) -> Self {
        StorageError::Decode(e.to_string())
    }
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;
