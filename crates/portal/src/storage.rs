//! Durable client-side key/value storage.
//!
//! Holds only the hidden-route unlock flag. [`FileStorage`] keeps a JSON
//! object on disk so the flag survives restarts; [`MemoryStorage`] is the
//! throwaway variant for tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value storage that outlives the process.
#[async_trait]
pub trait DurableStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// JSON-file-backed storage.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within the process
    lock: Mutex<()>,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DurableStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&entries)?).await?;
        tracing::debug!(key, path = %self.path.display(), "Stored value");
        Ok(())
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::new(&path);
        assert_eq!(storage.get("sol_whisper_unlocked").await.unwrap(), None);
        storage.set("sol_whisper_unlocked", "true").await.unwrap();

        let reopened = FileStorage::new(&path);
        assert_eq!(
            reopened.get("sol_whisper_unlocked").await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_file_storage_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage.json"));
        storage.set("a", "1").await.unwrap();
        storage.set("b", "2").await.unwrap();

        assert_eq!(storage.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(storage.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStorage::new(&path).get("a").await.unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.set("k", "v").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(storage.get("missing").await.unwrap(), None);
    }
}
