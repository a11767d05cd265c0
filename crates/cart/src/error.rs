//! Cart and persistence errors.

use thiserror::Error;

/// Errors returned to callers of [`CartStore`](crate::CartStore) mutations.
///
/// Informational: the UI shows the message and the shopper keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// The requested quantity would exceed the variant's stock.
    #[error("only {max} units available")]
    StockExceeded {
        /// The variant's stock, i.e. the most a line may ever hold.
        max: u32,
    },
}

/// Errors from the persisted slot.
///
/// These never escape the store; they are logged and the store falls back
/// to its in-memory state (or an empty cart on load).
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error from the underlying backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The slot holds data that cannot be decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The slot was written by a newer build with an unknown layout.
    #[error("unsupported cart layout version {0}")]
    UnsupportedVersion(u32),

    /// The backend refuses reads or writes (disabled, quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
