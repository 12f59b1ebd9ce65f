//! File-backed storage: one JSON object on disk.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::sync::Mutex;

use crate::{KeyValueStore, StoreError};

/// A key-value store persisted as a single JSON object file.
///
/// Every operation does a full read (or read-modify-write) of the
/// backing file. That's deliberate: the client stores a handful of small
/// values, and whole-file replacement gives us the same
/// single-key-write atomicity the platform storage offered. This is not
/// a database and should not be asked to behave like one.
///
/// A missing backing file reads as an empty map, so first launch needs
/// no setup step.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles so two concurrent `set`s
    /// can't interleave their file writes and drop one of the keys.
    lock: Mutex<()>,
}

impl FileStore {
    /// Creates a store backed by the JSON file at `path`.
    ///
    /// The file (and its parent directory) is created lazily on the
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_map(
        &self,
        map: &HashMap<String, String>,
    ) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let contents = serde_json::to_string_pretty(map)?;
        tokio::fs::write(&self.path, contents).await?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        let map = self.read_map().await?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}
