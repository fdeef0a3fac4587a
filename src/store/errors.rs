//! # Store Errors
//!
//! Persistence failures. They are opaque to clients and never retried.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Statement, transaction or connection failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A thread panicked while holding the connection
    #[error("Store connection lock poisoned")]
    Poisoned,

    /// A stored row could not be mapped back to a model
    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl StoreError {
    /// Stable code for log events
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Sqlite(_) => "BOOKING_STORE_SQLITE",
            StoreError::Poisoned => "BOOKING_STORE_POISONED",
            StoreError::InvalidData(_) => "BOOKING_STORE_INVALID_DATA",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(StoreError::Poisoned.code(), "BOOKING_STORE_POISONED");
        let err = StoreError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.code(), "BOOKING_STORE_SQLITE");
        assert!(err.to_string().starts_with("SQLite error"));
    }
}
