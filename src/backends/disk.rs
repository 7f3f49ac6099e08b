//! Snapshot store keeping one JSON file per key in a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::warn;

use crate::backend::SnapshotStore;
use crate::error::{VfsError, VfsResult};

#[derive(Debug, Clone)]
pub struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    /// Store blobs under `dir`, which is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, key: &str) -> VfsResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');
        if !valid {
            return Err(VfsError::InvalidArgument(format!("bad storage key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait::async_trait]
impl SnapshotStore for DiskStore {
    async fn load(&self, key: &str) -> VfsResult<Option<String>> {
        let path = self.blob_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, key: &str, blob: &str) -> VfsResult<()> {
        let path = self.blob_path(key)?;
        fs::create_dir_all(&self.dir).await?;

        // Write beside the target, then rename over it
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, blob).await?;
        if let Err(e) = fs::rename(&staging, &path).await {
            if let Err(cleanup) = fs::remove_file(&staging).await {
                warn!(
                    path = %staging.display(),
                    error = %cleanup,
                    "failed to remove staged snapshot"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> VfsResult<()> {
        let path = self.blob_path(key)?;
        match fs::remove_file(&path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
