//! In-memory key-value store.

use super::{KeyValueStore, StoreError, StoreResult, StoredValue};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Process-local store used by tests and ephemeral sessions.
///
/// Can be flipped to read-only to emulate disabled or full device storage.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<Entries>,
    read_only: AtomicBool,
}

#[derive(Debug, Default)]
struct Entries {
    live: BTreeMap<String, StoredValue>,
    /// Last version of each removed namespace; re-created values continue above it.
    retired: BTreeMap<String, u64>,
}

impl Entries {
    fn next_version(&self, namespace: &str) -> u64 {
        self.live
            .get(namespace)
            .map(|value| value.version)
            .or_else(|| self.retired.get(namespace).copied())
            .map_or(1, |version| version + 1)
    }

    fn insert(&mut self, namespace: &str, payload: Vec<u8>) -> u64 {
        let version = self.next_version(namespace);
        self.live
            .insert(namespace.to_string(), StoredValue { payload, version });
        version
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every subsequent `set`/`remove` with `StoreError::Unavailable`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Writes raw bytes regardless of version, bumping it.
    ///
    /// Used to seed legacy or corrupt payloads.
    pub fn put_raw(&self, namespace: &str, payload: impl Into<Vec<u8>>) {
        self.lock().insert(namespace, payload.into());
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Entries stay consistent across a panicking writer, so poison is ignored.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "memory store is read-only".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, namespace: &str) -> StoreResult<Option<StoredValue>> {
        Ok(self.lock().live.get(namespace).cloned())
    }

    fn set(
        &self,
        namespace: &str,
        payload: &[u8],
        expected_version: Option<u64>,
    ) -> StoreResult<u64> {
        self.ensure_writable()?;
        let mut entries = self.lock();
        let actual = entries.live.get(namespace).map(|value| value.version);
        if actual != expected_version {
            return Err(StoreError::VersionConflict {
                namespace: namespace.to_string(),
                expected: expected_version,
                actual,
            });
        }
        Ok(entries.insert(namespace, payload.to_vec()))
    }

    fn remove(&self, namespace: &str) -> StoreResult<()> {
        self.ensure_writable()?;
        let mut entries = self.lock();
        if let Some(removed) = entries.live.remove(namespace) {
            entries.retired.insert(namespace.to_string(), removed.version);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKvStore;
    use crate::store::{KeyValueStore, StoreError};

    #[test]
    fn set_requires_matching_version() {
        let store = MemoryKvStore::new();
        assert_eq!(store.set("ns", b"[]", None).unwrap(), 1);
        assert_eq!(store.set("ns", b"[1]", Some(1)).unwrap(), 2);

        let err = store.set("ns", b"[2]", Some(1)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict {
                expected: Some(1),
                actual: Some(2),
                ..
            }
        ));
        assert_eq!(store.get("ns").unwrap().unwrap().payload, b"[1]");
    }

    #[test]
    fn read_only_rejects_writes_and_keeps_data() {
        let store = MemoryKvStore::new();
        store.set("ns", b"[]", None).unwrap();
        store.set_read_only(true);

        assert!(matches!(
            store.set("ns", b"[1]", Some(1)),
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(store.remove("ns"), Err(StoreError::Unavailable(_))));
        assert_eq!(store.get("ns").unwrap().unwrap().payload, b"[]");
    }

    #[test]
    fn remove_makes_namespace_absent() {
        let store = MemoryKvStore::new();
        store.set("ns", b"true", None).unwrap();
        store.remove("ns").unwrap();
        store.remove("ns").unwrap();
        assert!(store.get("ns").unwrap().is_none());
        assert_eq!(store.set("ns", b"false", None).unwrap(), 2);
    }

    #[test]
    fn recreated_namespace_rejects_writer_from_before_removal() {
        let store = MemoryKvStore::new();
        assert_eq!(store.set("favorites", b"[1]", None).unwrap(), 1);
        store.remove("favorites").unwrap();
        assert_eq!(store.set("favorites", b"[99]", None).unwrap(), 2);

        let err = store.set("favorites", b"[1,2]", Some(1)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::VersionConflict {
                expected: Some(1),
                actual: Some(2),
                ..
            }
        ));
        assert_eq!(store.get("favorites").unwrap().unwrap().payload, b"[99]");
    }
}
