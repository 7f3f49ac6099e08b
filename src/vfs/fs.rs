//! Immutable filesystem snapshots and their copy-on-write mutations.

use std::sync::Arc;

use tracing::debug;

use crate::error::{VfsError, VfsResult};
use crate::types::{Node, NodeId, is_valid_name};

use super::resolve::{components, join, split_leaf};
use super::tree::Tree;

/// A tree paired with a current directory.
///
/// Cloning is cheap: the arena is shared. Every mutation builds a new arena
/// and leaves `self` untouched, so older snapshots stay valid.
#[derive(Debug, Clone)]
pub struct FileSystem {
    tree: Arc<Tree>,
    current: NodeId,
}

impl FileSystem {
    /// An empty filesystem: a root directory and nothing else.
    pub fn new() -> Self {
        let tree = Tree::new();
        let current = tree.root();
        Self {
            tree: Arc::new(tree),
            current,
        }
    }

    /// Pair `tree` with the directory at `current_path`, or the root if that
    /// path no longer names a directory.
    pub(crate) fn anchored(tree: Tree, current_path: &str) -> Self {
        let current = tree.resolve_directory(current_path).unwrap_or(tree.root());
        Self {
            tree: Arc::new(tree),
            current,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn current_directory(&self) -> NodeId {
        self.current
    }

    /// The node behind `id`, or `None` if `id` came from another snapshot.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id)
    }

    /// Resolve `path` against the current directory.
    pub fn resolve(&self, path: &str) -> Option<NodeId> {
        self.tree.resolve(path, self.current)
    }

    pub fn node_path(&self, id: NodeId) -> Option<String> {
        self.tree.node_path(id)
    }

    pub fn current_path(&self) -> String {
        self.tree
            .node_path(self.current)
            .unwrap_or_else(|| "/".to_string())
    }

    /// Whether both snapshots share the same arena.
    pub fn shares_tree_with(&self, other: &FileSystem) -> bool {
        Arc::ptr_eq(&self.tree, &other.tree)
    }

    pub fn change_directory(&self, path: &str) -> VfsResult<FileSystem> {
        let id = self.lookup_directory(path)?;
        Ok(Self {
            tree: Arc::clone(&self.tree),
            current: id,
        })
    }

    /// Children of the directory at `path`, in insertion order.
    pub fn list_directory(&self, path: &str) -> VfsResult<Vec<&Node>> {
        let id = self.lookup_directory(path)?;
        Ok(self
            .tree
            .children(id)
            .filter_map(|child| self.node(child))
            .collect())
    }

    /// URL stored in the file at `path`.
    pub fn read_file(&self, path: &str) -> VfsResult<&str> {
        let (_, node) = self.lookup(path)?;
        node.as_file()
            .map(|file| file.url())
            .ok_or_else(|| VfsError::IsADirectory(path.to_string()))
    }

    pub fn create_file(&self, path: &str, url: &str) -> VfsResult<FileSystem> {
        if url.trim().is_empty() {
            return Err(VfsError::InvalidArgument("empty url".into()));
        }

        let (parent_path, name) = split_leaf(path);
        if !is_valid_name(name) {
            return Err(VfsError::InvalidPath(format!("invalid file name: {path}")));
        }

        let parent = self.lookup_directory(parent_path)?;
        if self.has_child(parent, name) {
            return Err(VfsError::AlreadyExists(path.to_string()));
        }

        let parent_path = self.path_of(parent)?;
        let next = self.rebuild(self.current_path(), |tree| {
            let parent = clone_lookup(tree, &parent_path)?;
            tree.attach(parent, Node::new_file(name, url))?;
            Ok(())
        })?;
        debug!(path = %join(&parent_path, name), url, "created file");
        Ok(next)
    }

    /// Create the directory at `path`.
    ///
    /// Existing intermediate directories are always traversed; missing ones
    /// are created only when `recursive` is set. The final component must
    /// not exist yet.
    pub fn create_directory(&self, path: &str, recursive: bool) -> VfsResult<FileSystem> {
        if path.trim().is_empty() {
            return Err(VfsError::InvalidPath("empty path".into()));
        }
        let parts: Vec<&str> = components(path).collect();
        if parts.is_empty() {
            return Err(VfsError::AlreadyExists(path.to_string()));
        }

        let start = if path.starts_with('/') {
            "/".to_string()
        } else {
            self.current_path()
        };

        let mut created = String::new();
        let next = self.rebuild(self.current_path(), |tree| {
            let mut node = clone_lookup(tree, &start)?;
            let last = parts.len() - 1;
            for (i, part) in parts.iter().enumerate() {
                let is_last = i == last;
                match *part {
                    "." | ".." => {
                        if *part == ".." {
                            node = tree.parent(node).unwrap_or(node);
                        }
                        if is_last {
                            return Err(VfsError::AlreadyExists(path.to_string()));
                        }
                    }
                    name => {
                        node = match tree.child(node, name) {
                            Some(_) if is_last => {
                                return Err(VfsError::AlreadyExists(path.to_string()));
                            }
                            Some(child) if tree.get(child).is_some_and(Node::is_dir) => child,
                            Some(_) => return Err(VfsError::NotADirectory(path.to_string())),
                            None if is_last || recursive => {
                                tree.attach(node, Node::new_dir(name))?
                            }
                            None => return Err(VfsError::NotFound(path.to_string())),
                        };
                    }
                }
            }
            created = tree.node_path(node).unwrap_or_default();
            Ok(())
        })?;
        debug!(path = %created, recursive, "created directory");
        Ok(next)
    }

    pub fn delete_file(&self, path: &str) -> VfsResult<FileSystem> {
        let (id, node) = self.lookup(path)?;
        if node.is_dir() {
            return Err(VfsError::IsADirectory(path.to_string()));
        }
        let parent = self
            .tree
            .parent(id)
            .ok_or_else(|| VfsError::PermissionDenied("cannot remove root".into()))?;

        let removed = self.path_of(id)?;
        let next = self.remove_child(parent, node.name())?;
        debug!(path = %removed, "deleted file");
        Ok(next)
    }

    /// Delete the directory at `path`. A non-empty directory needs
    /// `recursive`. If the current directory was inside it, the result's
    /// current directory is the root.
    pub fn delete_directory(&self, path: &str, recursive: bool) -> VfsResult<FileSystem> {
        let (id, node) = self.lookup(path)?;
        if !node.is_dir() {
            return Err(VfsError::NotADirectory(path.to_string()));
        }
        let parent = self
            .tree
            .parent(id)
            .ok_or_else(|| VfsError::PermissionDenied("cannot remove root".into()))?;
        if !recursive && self.tree.children(id).next().is_some() {
            return Err(VfsError::DirectoryNotEmpty(path.to_string()));
        }

        let removed = self.path_of(id)?;
        let next = self.remove_child(parent, node.name())?;
        debug!(path = %removed, recursive, "deleted directory");
        Ok(next)
    }

    /// Move or rename the node at `source`.
    ///
    /// If `destination` names an existing directory the node moves into it
    /// under its own name; otherwise `destination` is read as
    /// `parent/new_name`. Moving a node to where it already is returns
    /// `self` unchanged.
    pub fn move_node(&self, source: &str, destination: &str) -> VfsResult<FileSystem> {
        let (source_id, source_node) = self.lookup(source)?;
        let source_parent = self
            .tree
            .parent(source_id)
            .ok_or_else(|| VfsError::PermissionDenied("cannot move root".into()))?;

        let (target_parent, target_name) = match self.lookup(destination) {
            Ok((id, node)) if node.is_dir() => (id, source_node.name()),
            Ok(_) => return Err(VfsError::AlreadyExists(destination.to_string())),
            Err(_) => {
                let (parent_path, name) = split_leaf(destination);
                if !is_valid_name(name) {
                    return Err(VfsError::InvalidPath(format!(
                        "invalid destination name: {destination}"
                    )));
                }
                (self.lookup_directory(parent_path)?, name)
            }
        };

        if self.tree.is_ancestor_or_self(source_id, target_parent) {
            return Err(VfsError::Cycle(destination.to_string()));
        }
        if target_parent == source_parent && target_name == source_node.name() {
            return Ok(self.clone());
        }
        if self.has_child(target_parent, target_name) {
            return Err(VfsError::AlreadyExists(destination.to_string()));
        }

        let old_path = self.path_of(source_id)?;
        let old_parent_path = self.path_of(source_parent)?;
        let target_parent_path = self.path_of(target_parent)?;
        let new_path = join(&target_parent_path, target_name);
        let anchor = rebase(&self.current_path(), &old_path, &new_path);

        let next = self.rebuild(anchor, |tree| {
            let old_parent = clone_lookup(tree, &old_parent_path)?;
            let moved = tree
                .detach(old_parent, source_node.name())
                .ok_or_else(|| VfsError::NotFound(old_path.clone()))?;
            let new_parent = clone_lookup(tree, &target_parent_path)?;
            tree.adopt(new_parent, moved, target_name)
        })?;
        debug!(from = %old_path, to = %new_path, "moved node");
        Ok(next)
    }

    fn lookup(&self, path: &str) -> VfsResult<(NodeId, &Node)> {
        self.resolve(path)
            .and_then(|id| Some((id, self.node(id)?)))
            .ok_or_else(|| VfsError::NotFound(path.to_string()))
    }

    fn lookup_directory(&self, path: &str) -> VfsResult<NodeId> {
        match self.lookup(path)? {
            (id, node) if node.is_dir() => Ok(id),
            _ => Err(VfsError::NotADirectory(path.to_string())),
        }
    }

    fn path_of(&self, id: NodeId) -> VfsResult<String> {
        self.node_path(id)
            .ok_or_else(|| VfsError::NotFound("node from another snapshot".into()))
    }

    fn has_child(&self, dir: NodeId, name: &str) -> bool {
        self.tree.child(dir, name).is_some()
    }

    fn remove_child(&self, parent: NodeId, name: &str) -> VfsResult<FileSystem> {
        let parent_path = self.path_of(parent)?;
        self.rebuild(self.current_path(), |tree| {
            let parent = clone_lookup(tree, &parent_path)?;
            tree.remove(parent, name)
                .ok_or_else(|| VfsError::NotFound(join(&parent_path, name)))
        })
    }

    /// Deep-clone the tree, apply `edit` to the clone, then re-anchor the
    /// current directory at `anchor` in the clone (root if it is gone).
    fn rebuild<F>(&self, anchor: String, edit: F) -> VfsResult<FileSystem>
    where
        F: FnOnce(&mut Tree) -> VfsResult<()>,
    {
        let mut tree = self.tree.deep_clone();
        edit(&mut tree)?;
        Ok(Self::anchored(tree, &anchor))
    }
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve an absolute path taken from the original tree inside its clone.
fn clone_lookup(tree: &Tree, path: &str) -> VfsResult<NodeId> {
    tree.resolve_directory(path).ok_or_else(|| VfsError::NotFound(path.to_string()))
}

/// Replace the `from` prefix of `path` with `to`, if `path` lies under `from`.
fn rebase(path: &str, from: &str, to: &str) -> String {
    match path.strip_prefix(from) {
        Some("") => to.to_string(),
        Some(rest) if rest.starts_with('/') => format!("{to}{rest}"),
        _ => path.to_string(),
    }
}
