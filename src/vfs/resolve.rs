//! Path resolution over a [`Tree`].

use crate::types::NodeId;

use super::tree::Tree;

/// Map `path` to a node, starting at `current` for relative paths and at the
/// root for absolute ones.
///
/// Blank paths resolve to `current`. Empty components and `.` are skipped,
/// `..` above the root stays at the root. Stepping into a file, or naming a
/// child that does not exist, fails the whole resolution. So does a
/// `current` taken from some other tree.
pub fn resolve_path(path: &str, current: NodeId, tree: &Tree) -> Option<NodeId> {
    if !tree.contains(current) {
        return None;
    }
    if path.trim().is_empty() {
        return Some(current);
    }

    let mut node = if path.starts_with('/') {
        tree.root()
    } else {
        current
    };

    for component in components(path) {
        match component {
            "." => {}
            ".." => {
                if let Some(parent) = tree.parent(node) {
                    node = parent;
                }
            }
            name => node = tree.child(node, name)?,
        }
    }

    Some(node)
}

/// Non-empty `/`-separated components of `path`.
pub(crate) fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|c| !c.is_empty())
}

/// Split `path` into its parent path and final segment.
///
/// A path with no `/` has an empty parent, which resolves to the current
/// directory; a single leading `/` yields the root.
pub(crate) fn split_leaf(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some(("", leaf)) => ("/", leaf),
        Some((parent, leaf)) => (parent, leaf),
        None => ("", path),
    }
}

/// Join an absolute directory path and a child name.
pub(crate) fn join(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}
