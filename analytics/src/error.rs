use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Failed to fetch analytics: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
