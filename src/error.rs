use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum VfsError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("cannot move a directory into itself: {0}")]
    Cycle(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid snapshot: {0}")]
    Invalid(String),

    #[error("backend I/O error: {0}")]
    BackendIo(String),

    // std::io::Error is stringified so it works with Serialize/Deserialize
    #[error("system I/O error: {0}")]
    SystemIo(String),
}

impl From<std::io::Error> for VfsError {
    fn from(e: std::io::Error) -> Self {
        VfsError::SystemIo(e.to_string())
    }
}

impl From<serde_json::Error> for VfsError {
    fn from(e: serde_json::Error) -> Self {
        VfsError::Invalid(e.to_string())
    }
}

pub type VfsResult<T> = Result<T, VfsError>;
