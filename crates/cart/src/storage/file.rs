//! File-backed slot storage.
//!
//! Each key maps to `<dir>/<key>.json`. Writes go to a temporary sibling
//! first and are renamed into place, so readers never see a torn file.
//!
//! Other processes editing the same directory are noticed by polling: the
//! backend remembers the last bytes it read or wrote for every key it has
//! touched, and [`FileStorage::poll_external_changes`] publishes an event
//! (with no origin) for each key whose file no longer matches.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use super::{CartStorage, EVENT_CAPACITY, StorageEvent, WriterId};
use crate::error::StorageResult;

/// File-backed slot storage.
#[derive(Clone)]
pub struct FileStorage {
    inner: Arc<FileStorageInner>,
}

struct FileStorageInner {
    dir: PathBuf,
    events: broadcast::Sender<StorageEvent>,
    /// Last contents seen per key (`None` = file absent).
    known: Mutex<HashMap<String, Option<Vec<u8>>>>,
}

impl FileStorage {
    /// Create a storage rooted at `dir`. The directory is created on first
    /// write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(FileStorageInner {
                dir: dir.into(),
                events,
                known: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Directory holding the slot files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.inner.path_for(key)
    }

    /// Compare every tracked key against its file and publish an event for
    /// each one that changed behind this backend's back.
    ///
    /// Returns the keys that changed.
    pub fn poll_external_changes(&self) -> Vec<String> {
        self.inner.poll()
    }

    /// Spawn a task that calls [`poll_external_changes`](Self::poll_external_changes)
    /// every `interval`.
    ///
    /// The task ends once every clone of this storage has been dropped.
    #[must_use]
    pub fn watch(&self, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<FileStorageInner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    debug!("File storage dropped, stopping watcher");
                    break;
                };
                inner.poll();
            }
        })
    }
}

impl FileStorageInner {
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }

    /// Last-seen contents per key.
    ///
    /// Held across every read-compare and write-remember pair, so a poll
    /// can never observe this backend's own write before it is remembered.
    fn known(&self) -> MutexGuard<'_, HashMap<String, Option<Vec<u8>>>> {
        self.known.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match std::fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, bytes: &[u8], origin: WriterId) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(key);
        let tmp = path.with_extension(format!("json.{origin}.tmp"));
        std::fs::write(&tmp, bytes)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }

    fn publish(&self, key: &str, origin: Option<WriterId>) {
        // No subscribers is fine
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            origin,
        });
    }

    fn poll(&self) -> Vec<String> {
        let mut changed = Vec::new();
        {
            let mut known = self.known();
            for (key, last) in known.iter_mut() {
                match self.read(key) {
                    Ok(contents) => {
                        if *last != contents {
                            debug!(key = %key, "Slot file changed externally");
                            *last = contents;
                            changed.push(key.clone());
                        }
                    }
                    Err(e) => warn!(key = %key, error = %e, "Failed to poll slot file"),
                }
            }
        }

        for key in &changed {
            self.publish(key, None);
        }
        changed
    }
}

impl CartStorage for FileStorage {
    #[instrument(skip(self))]
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let mut known = self.inner.known();
        let contents = self.inner.read(key)?;
        known.insert(key.to_string(), contents.clone());
        Ok(contents)
    }

    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    fn save(&self, key: &str, bytes: &[u8], origin: WriterId) -> StorageResult<()> {
        let changed = {
            let mut known = self.inner.known();
            self.inner.write(key, bytes, origin)?;
            let contents = Some(bytes.to_vec());
            let changed = known.get(key) != Some(&contents);
            known.insert(key.to_string(), contents);
            changed
        };

        if changed {
            self.inner.publish(key, Some(origin));
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }
}

/// Map a key to a safe file stem.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("beauty_cart"), "beauty_cart");
        assert_eq!(sanitize_key("../etc/passwd"), "___etc_passwd");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.load("cart").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.save("cart", b"[1]", WriterId::new()).unwrap();

        assert_eq!(storage.load("cart").unwrap().unwrap(), b"[1]");
        assert!(storage.path_for("cart").exists());
        // Only the slot file remains
        assert_eq!(std::fs::read_dir(storage.dir()).unwrap().count(), 1);
    }

    #[test]
    fn test_own_writes_are_not_external_changes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.load("cart").unwrap();
        storage.save("cart", b"[]", WriterId::new()).unwrap();

        assert!(storage.poll_external_changes().is_empty());
    }

    #[test]
    fn test_poll_detects_foreign_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.load("cart").unwrap();
        let mut rx = storage.subscribe();

        std::fs::write(storage.path_for("cart"), b"[2]").unwrap();

        assert_eq!(storage.poll_external_changes(), vec!["cart".to_string()]);
        let event = rx.try_recv().unwrap();
        assert_eq!(event.key, "cart");
        assert_eq!(event.origin, None);

        // Reported once
        assert!(storage.poll_external_changes().is_empty());
    }

    #[test]
    fn test_poll_detects_deletion() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.save("cart", b"[]", WriterId::new()).unwrap();

        std::fs::remove_file(storage.path_for("cart")).unwrap();

        assert_eq!(storage.poll_external_changes(), vec!["cart".to_string()]);
    }

    #[test]
    fn test_untracked_keys_are_not_polled() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.path_for("other"), b"[]").unwrap();
        assert!(storage.poll_external_changes().is_empty());
    }

    #[tokio::test]
    async fn test_watch_publishes_foreign_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.load("cart").unwrap();
        let mut rx = storage.subscribe();
        let handle = storage.watch(Duration::from_millis(10));

        std::fs::write(storage.path_for("cart"), b"[3]").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.key, "cart");
        handle.abort();
    }
}
