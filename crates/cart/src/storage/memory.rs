//! In-memory slot storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::broadcast;

use super::{CartStorage, EVENT_CAPACITY, StorageEvent, WriterId};
use crate::error::{StorageError, StorageResult};

/// In-memory, HashMap-based slot storage.
///
/// Intended for tests and embedding. Clones share the same slots and the
/// same event channel.
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<MemoryStorageInner>,
}

struct MemoryStorageInner {
    slots: RwLock<HashMap<String, Vec<u8>>>,
    events: broadcast::Sender<StorageEvent>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    /// Create a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(MemoryStorageInner {
                slots: RwLock::new(HashMap::new()),
                events,
                unavailable: AtomicBool::new(false),
            }),
        }
    }

    /// Overwrite a slot as an unidentified writer would.
    ///
    /// Publishes a change event with no origin, like an edit made by
    /// another program.
    pub fn set_raw(&self, key: &str, bytes: &[u8]) {
        self.write(key, bytes, None);
    }

    /// Raw contents of a slot.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.inner
            .slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Make every subsequent `load`/`save` fail until re-enabled.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StorageResult<()> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("storage disabled".to_string()));
        }
        Ok(())
    }

    fn write(&self, key: &str, bytes: &[u8], origin: Option<WriterId>) {
        let changed = {
            let mut slots = self
                .inner
                .slots
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let changed = slots.get(key).is_none_or(|old| old.as_slice() != bytes);
            if changed {
                slots.insert(key.to_string(), bytes.to_vec());
            }
            changed
        };

        if changed {
            // No subscribers is fine
            let _ = self.inner.events.send(StorageEvent {
                key: key.to_string(),
                origin,
            });
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        self.check_available()?;
        Ok(self.raw(key))
    }

    fn save(&self, key: &str, bytes: &[u8], origin: WriterId) -> StorageResult<()> {
        self.check_available()?;
        self.write(key, bytes, Some(origin));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }
}
