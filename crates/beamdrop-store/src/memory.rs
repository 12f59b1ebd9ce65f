//! In-memory storage backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{KeyValueStore, StoreError};

/// An in-memory key-value store backed by a shared map.
///
/// `Clone` is shallow: clones share the same underlying map, the way two
/// handles to the same device storage would. Tests lean on this to
/// simulate a process restart — build a second consumer over a clone and
/// it sees everything the first one persisted.
///
/// Not durable: all data is lost when the last clone is dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("store lock poisoned").len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("store lock poisoned").is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().expect("store lock poisoned");
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().expect("store lock poisoned");
        entries.remove(key);
        Ok(())
    }
}
