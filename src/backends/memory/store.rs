//! Core MemoryStore implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::error;

use crate::backend::SnapshotStore;
use crate::error::{VfsError, VfsResult};

/// In-memory snapshot store, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with one blob, e.g. a snapshot written by an older run
    pub fn with_blob(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let blobs = HashMap::from([(key.into(), blob.into())]);
        Self {
            blobs: Arc::new(RwLock::new(blobs)),
        }
    }

    pub fn len(&self) -> VfsResult<usize> {
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.len())
    }

    pub fn is_empty(&self) -> VfsResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn poisoned<T>(_: T) -> VfsError {
    error!("memory store lock poisoned");
    VfsError::BackendIo("memory store lock poisoned".into())
}

#[async_trait::async_trait]
impl SnapshotStore for MemoryStore {
    async fn load(&self, key: &str) -> VfsResult<Option<String>> {
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.get(key).cloned())
    }

    async fn save(&self, key: &str, blob: &str) -> VfsResult<()> {
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> VfsResult<()> {
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        blobs.remove(key);
        Ok(())
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Panic while holding the write lock. Call from a thread that is
    /// allowed to die.
    pub(crate) fn poison_for_test(&self) {
        let _guard = self.blobs.write();
        panic!("poisoning memory store lock");
    }
}
