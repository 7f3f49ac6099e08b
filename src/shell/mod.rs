//! Shell-style command layer over the filesystem core, plus the session that
//! persists each new snapshot.

pub mod commands;
pub mod opener;
pub mod parser;

use tracing::error;

use crate::backend::SnapshotStore;
use crate::vfs::FileSystem;

pub use commands::{CommandContext, CommandOutput, execute, run_line};
pub use opener::{CommandOpener, UrlOpener, normalize_url};
pub use parser::{ParseError, ParsedCommand, parse_command};

/// One interactive session: the current snapshot, where it is persisted and
/// how bookmarks get opened.
pub struct Shell<S> {
    fs: FileSystem,
    store: S,
    key: String,
    opener: Box<dyn UrlOpener>,
}

impl<S: SnapshotStore> Shell<S> {
    /// Load the snapshot stored under `key`, falling back to an empty
    /// filesystem.
    pub async fn open(store: S, key: impl Into<String>, opener: Box<dyn UrlOpener>) -> Self {
        let key = key.into();
        let fs = store.load_file_system(&key).await;
        Self {
            fs,
            store,
            key,
            opener,
        }
    }

    pub fn fs(&self) -> &FileSystem {
        &self.fs
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prompt(&self) -> String {
        format!("{} $", self.fs.current_path())
    }

    /// Run one input line, adopt the resulting snapshot and persist it.
    ///
    /// A failed save is reported on the output but the new snapshot is kept.
    pub async fn run(&mut self, line: &str) -> CommandOutput {
        let mut output = run_line(
            line,
            &CommandContext {
                fs: &self.fs,
                opener: self.opener.as_ref(),
            },
        );

        if let Some(next) = output.next_fs.take() {
            self.fs = next;
            if let Err(e) = self.store.save_file_system(&self.key, &self.fs).await {
                error!(key = %self.key, error = %e, "failed to persist filesystem");
                output.error.get_or_insert_with(|| format!("warning: changes not saved: {e}"));
            }
        }

        output
    }
}
