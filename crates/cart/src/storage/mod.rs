//! Key-value persistence for the cart slot.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - process-local map. Clones share the map, so several
//!   stores opened on clones of one `MemoryStorage` behave like several tabs
//!   of one browser origin.
//! - [`FileStorage`] - one JSON file per key. A poller notices files
//!   rewritten by other processes.
//!
//! # Change events
//!
//! Every backend publishes a [`StorageEvent`] when a slot's value changes.
//! Writes made through the trait carry the writer's [`WriterId`] so a store
//! can recognize, and skip, the echo of its own writes. Changes whose writer
//! is unknown carry `origin: None`.

mod file;
mod memory;

use std::fmt;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::StorageResult;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Buffered change events per subscriber before it starts lagging.
pub(crate) const EVENT_CAPACITY: usize = 64;

/// Identity of a store instance, attached to the writes it makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriterId(Uuid);

impl WriterId {
    /// A fresh random writer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WriterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification that the value under `key` changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// Who wrote the new value, when known.
    pub origin: Option<WriterId>,
}

/// Durable key-value slot storage.
///
/// Implementations must be cheap to share between threads; the store keeps
/// one behind an `Arc` for its whole lifetime.
pub trait CartStorage: Send + Sync + 'static {
    /// Read the value under `key`.
    ///
    /// Returns `Ok(None)` if the key has never been written.
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the value under `key`, attributing the write to `origin`.
    ///
    /// Publishes a [`StorageEvent`] if the stored value changed.
    fn save(&self, key: &str, bytes: &[u8], origin: WriterId) -> StorageResult<()>;

    /// Receive change events for every key of this backend.
    fn subscribe(&self) -> broadcast::Receiver<StorageEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_ids_are_unique() {
        assert_ne!(WriterId::new(), WriterId::new());
    }
}
