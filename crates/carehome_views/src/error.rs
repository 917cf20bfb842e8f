//! Custom error types for the view layer.

use thiserror::Error;

/// View-layer errors.
#[derive(Debug, Error)]
pub enum ViewsError {
    #[error("store error: {0}")]
    Store(#[from] carehome_store_client::StoreError),

    #[error("limit must be at least 1, got {0}")]
    InvalidLimit(u64),

    #[error("page must be at least 1, got {0}")]
    InvalidPage(u64),

    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("timestamp {0:?} is not ISO-8601 formatted")]
    MalformedTimestamp(String),
}

/// Result type alias for view operations.
pub type ViewsResult<T> = Result<T, ViewsError>;
