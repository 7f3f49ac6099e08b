//! JSON snapshot of a filesystem: the tree plus the current path.
//!
//! ```json
//! {"root":{"type":"directory","name":"","children":[
//!     {"type":"file","name":"site","url":"example.com"}]},
//!  "currentPath":"/","savedAt":1700000000000}
//! ```

use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, serde_as};
use tracing::{debug, warn};

use crate::error::{VfsError, VfsResult};
use crate::types::{Node, NodeId, NodeKind, is_valid_name};
use crate::vfs::{FileSystem, Tree};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum SerializedNode {
    File {
        name: String,
        url: String,
    },
    Directory {
        name: String,
        children: Vec<SerializedNode>,
    },
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedFileSystem {
    root: SerializedNode,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    current_path: String,
    #[serde(with = "serde_millis", default = "SystemTime::now")]
    saved_at: SystemTime,
}

/// Render `fs` as a JSON snapshot.
pub fn serialize(fs: &FileSystem) -> VfsResult<String> {
    let tree = fs.tree();
    let payload = SerializedFileSystem {
        root: serialize_node(tree, tree.root()),
        current_path: fs.current_path(),
        saved_at: SystemTime::now(),
    };
    Ok(serde_json::to_string(&payload)?)
}

fn serialize_node(tree: &Tree, id: NodeId) -> SerializedNode {
    let name = tree.get(id).map(|node| node.name().to_string()).unwrap_or_default();
    match tree.get(id).map(Node::kind) {
        Some(NodeKind::File(file)) => SerializedNode::File {
            name,
            url: file.url().to_string(),
        },
        _ => SerializedNode::Directory {
            name,
            children: tree.children(id).map(|child| serialize_node(tree, child)).collect(),
        },
    }
}

/// Rebuild a filesystem from a JSON snapshot.
///
/// Only a structurally broken payload is an error. A stored current path
/// that no longer names a directory falls back to the root. Nesting depth
/// is not limited; the parser grows its stack as needed.
pub fn deserialize(text: &str) -> VfsResult<FileSystem> {
    let mut json = serde_json::Deserializer::from_str(text);
    json.disable_recursion_limit();
    let stacked = serde_stacker::Deserializer::new(&mut json);
    let payload = SerializedFileSystem::deserialize(stacked)?;
    json.end()?;

    let SerializedNode::Directory { children, .. } = payload.root else {
        return Err(VfsError::Invalid("top-level record is not a directory".into()));
    };

    let mut tree = Tree::new();
    let mut pending = vec![(tree.root(), children)];
    while let Some((parent, children)) = pending.pop() {
        for record in children {
            if let Some(next) = build_node(&mut tree, parent, record)? {
                pending.push(next);
            }
        }
    }

    debug!(
        saved_at = ?payload.saved_at,
        current_path = %payload.current_path,
        "restored filesystem snapshot"
    );
    Ok(FileSystem::anchored(tree, &payload.current_path))
}

/// Attach one record under `parent`. A directory comes back with its
/// children still to be attached.
fn build_node(
    tree: &mut Tree,
    parent: NodeId,
    record: SerializedNode,
) -> VfsResult<Option<(NodeId, Vec<SerializedNode>)>> {
    match record {
        SerializedNode::File { name, url } => {
            check_name(&name)?;
            if url.trim().is_empty() {
                return Err(VfsError::Invalid(format!("file '{name}' has no url")));
            }
            tree.attach(parent, Node::new_file(name, url))?;
            Ok(None)
        }
        SerializedNode::Directory { name, children } => {
            check_name(&name)?;
            let id = tree.attach(parent, Node::new_dir(name))?;
            Ok(Some((id, children)))
        }
    }
}

fn check_name(name: &str) -> VfsResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(VfsError::Invalid(format!("bad node name: {name:?}")))
    }
}

/// Restore a persisted snapshot, or start empty when there is none or it
/// cannot be read.
pub fn restore_or_empty(text: Option<&str>) -> FileSystem {
    let Some(text) = text else {
        return FileSystem::new();
    };

    match deserialize(text) {
        Ok(fs) => fs,
        Err(e) => {
            warn!(error = %e, "discarding unreadable filesystem snapshot");
            FileSystem::new()
        }
    }
}
