//! Command line options and the session configuration derived from them.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::backend::DEFAULT_STORAGE_KEY;

#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

/// Terminal over a filesystem of URL bookmarks
#[derive(Parser, Debug, Clone)]
#[command(name = "markfs", version)]
pub struct Cli {
    /// Directory holding persisted snapshots
    #[arg(long, default_value = ".markfs")]
    pub data_dir: PathBuf,
    /// Key the snapshot is stored under
    #[arg(long, default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,
    /// Keep the filesystem in memory only
    #[arg(long)]
    pub in_memory: bool,
    /// Program used by `open` (defaults to the platform opener)
    #[arg(long)]
    pub opener: Option<String>,
    #[arg(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Storage {
    Memory,
    Disk(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub storage: Storage,
    pub storage_key: String,
    pub opener: Option<String>,
}

impl From<Cli> for ShellConfig {
    fn from(cli: Cli) -> Self {
        let storage = if cli.in_memory {
            Storage::Memory
        } else {
            Storage::Disk(cli.data_dir)
        };
        ShellConfig {
            storage,
            storage_key: cli.storage_key,
            opener: cli.opener,
        }
    }
}
