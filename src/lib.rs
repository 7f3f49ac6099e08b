//! markfs: a terminal over URL bookmarks kept in a copy-on-write virtual
//! filesystem.

pub mod backend;
pub mod backends;
pub mod codec;
pub mod config;
pub mod error;
pub mod shell;
pub mod types;
pub mod vfs;

// Re-export
pub use backend::{DEFAULT_STORAGE_KEY, SnapshotStore};
pub use error::{VfsError, VfsResult};
pub use types::*;
pub use vfs::{FileSystem, Tree, resolve_path};
