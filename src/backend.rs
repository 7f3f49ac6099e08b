use tracing::{debug, warn};

use crate::codec;
use crate::error::VfsResult;
use crate::vfs::FileSystem;

/// Key the shell persists its filesystem under.
pub const DEFAULT_STORAGE_KEY: &str = "markfs.filesystem";

/// Storage for opaque snapshot blobs, keyed by name.
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    async fn load(&self, key: &str) -> VfsResult<Option<String>>;

    async fn save(&self, key: &str, blob: &str) -> VfsResult<()>;

    async fn remove(&self, key: &str) -> VfsResult<()>;

    /// Read the filesystem stored under `key`. A missing, unreadable or
    /// corrupt snapshot yields an empty filesystem.
    async fn load_file_system(&self, key: &str) -> FileSystem {
        let blob = match self.load(key).await {
            Ok(blob) => blob,
            Err(e) => {
                warn!(key, error = %e, "failed to read filesystem snapshot");
                None
            }
        };
        codec::restore_or_empty(blob.as_deref())
    }

    async fn save_file_system(&self, key: &str, fs: &FileSystem) -> VfsResult<()> {
        let blob = codec::serialize(fs)?;
        self.save(key, &blob).await?;
        debug!(key, bytes = blob.len(), "saved filesystem snapshot");
        Ok(())
    }
}
