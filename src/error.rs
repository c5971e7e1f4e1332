//! Error types for the engine.
//!
//! Uses `thiserror` for ergonomic error definitions. Range and port parse
//! errors live next to their types; this module carries the storage-facing
//! taxonomy. Connection-level failures are deliberately absent: they are
//! data (a closed result), not errors.

use thiserror::Error;

/// Errors raised by the result store. A failed batch persists nothing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored timestamp is not valid ISO-8601: {0}")]
    InvalidTimestamp(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
