//! File-backed step store.
//!
//! One JSON file per signup attempt. This is the native-client analog of
//! browser session storage: partial progress survives a process restart and
//! the file is deleted when the store is cleared.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::traits::{StepPayload, StepStore};
use crate::error::StoreError;

/// Step store backed by a single JSON file.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the backing file.
    lock: Mutex<()>,
}

impl FileStore {
    /// Store backed by `path`. Parent directories are created on first save.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<BTreeMap<String, StepPayload>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path).await?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write_map(&self, map: &BTreeMap<String, StepPayload>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let raw = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl StepStore for FileStore {
    async fn save(&self, key: &str, payload: &StepPayload) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), payload.clone());
        self.write_map(&map).await?;
        debug!(key, path = %self.path.display(), "Step payload saved");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StepPayload>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn get_all(&self) -> Result<BTreeMap<String, StepPayload>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_map().await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        if self.path.exists() {
            fs::remove_file(&self.path).await?;
        }
        debug!(path = %self.path.display(), "Step store cleared");
        Ok(())
    }
}
