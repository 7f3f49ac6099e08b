//! Arena holding the nodes of one filesystem snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use indextree::Arena;

use crate::error::{VfsError, VfsResult};
use crate::types::{Node, NodeId};

use super::resolve::resolve_path;

type RawId = indextree::NodeId;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Arena of nodes rooted at an unnamed directory.
///
/// Public lookups take a tagged [`NodeId`] and return `None` for ids minted
/// by another tree. Inside the module, raw arena ids are only ever taken
/// from this arena.
#[derive(Debug)]
pub struct Tree {
    tag: u64,
    arena: Arena<Node>,
    root: RawId,
}

impl Tree {
    /// A tree holding nothing but the root directory
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(Node::new_dir(""));
        Self {
            tag: NEXT_TAG.fetch_add(1, Ordering::Relaxed),
            arena,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.tagged(self.root)
    }

    fn tagged(&self, index: RawId) -> NodeId {
        NodeId {
            tree: self.tag,
            index,
        }
    }

    /// Untag `id` if it belongs to this tree and still names a live node.
    fn raw(&self, id: NodeId) -> Option<RawId> {
        if id.tree != self.tag {
            return None;
        }
        self.arena
            .get(id.index)
            .filter(|_| !id.index.is_removed(&self.arena))
            .map(|_| id.index)
    }

    fn data(&self, raw: RawId) -> &Node {
        self.arena[raw].get()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.raw(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.raw(id).map(|raw| self.data(raw))
    }

    /// Parent directory of `id`; `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let raw = self.raw(id)?;
        self.arena[raw].parent().map(|parent| self.tagged(parent))
    }

    /// Children of `id` in insertion order. Files have none.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.raw(id)
            .into_iter()
            .flat_map(move |raw| raw.children(&self.arena))
            .map(move |child| self.tagged(child))
    }

    /// The child of `dir` called `name`.
    pub fn child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        let raw = self.raw(dir)?;
        self.raw_child(raw, name).map(|child| self.tagged(child))
    }

    fn raw_child(&self, dir: RawId, name: &str) -> Option<RawId> {
        dir.children(&self.arena)
            .find(|child| self.data(*child).name == name)
    }

    /// Resolve `path` starting at `current` (or the root for absolute paths).
    pub fn resolve(&self, path: &str, current: NodeId) -> Option<NodeId> {
        resolve_path(path, current, self)
    }

    /// Resolve an absolute path to a directory.
    pub(crate) fn resolve_directory(&self, path: &str) -> Option<NodeId> {
        self.resolve(path, self.root())
            .filter(|id| self.get(*id).is_some_and(Node::is_dir))
    }

    /// Absolute path of `id`, rebuilt from its ancestors.
    pub fn node_path(&self, id: NodeId) -> Option<String> {
        let raw = self.raw(id)?;
        let mut parts: Vec<&str> = raw
            .ancestors(&self.arena)
            .filter(|ancestor| *ancestor != self.root)
            .map(|ancestor| self.data(ancestor).name.as_str())
            .collect();
        parts.reverse();
        Some(format!("/{}", parts.join("/")))
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        match (self.raw(ancestor), self.raw(id)) {
            (Some(ancestor), Some(id)) => id.ancestors(&self.arena).any(|a| a == ancestor),
            _ => false,
        }
    }

    /// Number of nodes reachable from the root, root included.
    pub fn reachable_count(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    /// Copy every node reachable from the root into a fresh arena with a
    /// new tag. Ids taken from `self` do not resolve in the copy.
    pub fn deep_clone(&self) -> Tree {
        let mut copy = Tree::new();
        let mut stack = vec![(self.root, copy.root)];
        while let Some((source, target)) = stack.pop() {
            for child in source.children(&self.arena) {
                let fresh = copy.arena.new_node(self.data(child).clone());
                target.append(fresh, &mut copy.arena);
                stack.push((child, fresh));
            }
        }
        copy
    }

    fn raw_directory(&self, id: NodeId) -> VfsResult<RawId> {
        let raw = self
            .raw(id)
            .ok_or_else(|| VfsError::NotFound("node from another snapshot".into()))?;
        if self.data(raw).is_dir() {
            Ok(raw)
        } else {
            Err(VfsError::NotADirectory(self.data(raw).name.clone()))
        }
    }

    /// Add `node` under `parent`, replacing any child with the same name.
    pub(crate) fn attach(&mut self, parent: NodeId, node: Node) -> VfsResult<NodeId> {
        let parent = self.raw_directory(parent)?;
        let existing = self.raw_child(parent, &node.name);
        let id = self.arena.new_node(node);
        if let Some(existing) = existing {
            existing.remove_subtree(&mut self.arena);
        }
        parent.append(id, &mut self.arena);
        Ok(self.tagged(id))
    }

    /// Link a detached node under `parent` with a new name.
    pub(crate) fn adopt(&mut self, parent: NodeId, id: NodeId, name: &str) -> VfsResult<()> {
        let parent = self.raw_directory(parent)?;
        let raw = self
            .raw(id)
            .ok_or_else(|| VfsError::NotFound(name.to_string()))?;
        parent
            .checked_append(raw, &mut self.arena)
            .map_err(|e| VfsError::Cycle(format!("{name}: {e:?}")))?;
        if let Some(node) = self.arena.get_mut(raw) {
            node.get_mut().name = name.to_string();
        }
        Ok(())
    }

    /// Unlink the child `name` from `parent` and return it. The subtree
    /// stays in the arena so it can be adopted elsewhere.
    pub(crate) fn detach(&mut self, parent: NodeId, name: &str) -> Option<NodeId> {
        let child = self.raw_child(self.raw(parent)?, name)?;
        child.detach(&mut self.arena);
        Some(self.tagged(child))
    }

    /// Drop the child `name` of `parent` and its whole subtree.
    pub(crate) fn remove(&mut self, parent: NodeId, name: &str) -> Option<()> {
        let child = self.raw_child(self.raw(parent)?, name)?;
        child.remove_subtree(&mut self.arena);
        Some(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
