//! Node model shared by the resolver, the mutator and the snapshot codec.

use serde::{Deserialize, Serialize};

/// Handle to a node inside one [`Tree`](crate::vfs::Tree).
///
/// Every tree carries its own tag and stamps it into the ids it hands out.
/// Looking up an id in any other tree, including the copy a mutation makes,
/// finds nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) tree: u64,
    pub(crate) index: indextree::NodeId,
}

/// Enum for distinguishing node kinds at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    File,
    Directory,
}

/// A bookmark: the file's only payload is its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub(crate) url: String,
}

impl FileNode {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A directory. Its children are the node's children in the arena; see
/// [`Tree::children`](crate::vfs::Tree::children).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectoryNode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File(FileNode),
    Directory(DirectoryNode),
}

/// A file or directory in the tree. Parent and child edges live in the
/// arena, not in the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new_file(name: impl Into<String>, url: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            kind: NodeKind::File(FileNode { url: url.into() }),
        }
    }

    pub(crate) fn new_dir(name: impl Into<String>) -> Self {
        Node {
            name: name.into(),
            kind: NodeKind::Directory(DirectoryNode),
        }
    }

    /// Segment label; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn file_type(&self) -> FileType {
        match self.kind {
            NodeKind::File(_) => FileType::File,
            NodeKind::Directory(_) => FileType::Directory,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match &self.kind {
            NodeKind::File(file) => Some(file),
            NodeKind::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match &self.kind {
            NodeKind::Directory(dir) => Some(dir),
            NodeKind::File(_) => None,
        }
    }
}

/// Narrow a node to its file variant.
pub fn is_file(node: &Node) -> Option<&FileNode> {
    node.as_file()
}

/// Narrow a node to its directory variant.
pub fn is_directory(node: &Node) -> Option<&DirectoryNode> {
    node.as_directory()
}

/// Whether `name` can label a node inside a directory.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/')
}
