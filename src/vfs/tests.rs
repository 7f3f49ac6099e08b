//! Tests for the copy-on-write filesystem core.

use crate::VfsError;
use crate::types::{FileType, is_directory, is_file};

use super::FileSystem;

fn names(fs: &FileSystem, path: &str) -> Vec<String> {
    let mut names: Vec<String> = fs
        .list_directory(path)
        .unwrap()
        .into_iter()
        .map(|node| match node.file_type() {
            FileType::Directory => format!("{}/", node.name()),
            FileType::File => node.name().to_string(),
        })
        .collect();
    names.sort();
    names
}

/// /a/file.txt, /a/sub/, /b/
fn populated() -> FileSystem {
    FileSystem::new()
        .create_directory("/a/sub", true)
        .unwrap()
        .create_directory("/b", false)
        .unwrap()
        .create_file("/a/file.txt", "example.com")
        .unwrap()
}

#[test]
fn test_empty_filesystem() {
    let fs = FileSystem::new();
    assert_eq!(fs.current_path(), "/");
    assert_eq!(fs.current_directory(), fs.root());
    assert!(fs.list_directory(".").unwrap().is_empty());
}

#[test]
fn test_bookmark_scenario() {
    let fs = FileSystem::new();

    let fs = fs.create_directory("/projects", false).unwrap();
    assert_eq!(names(&fs, "/"), ["projects/"]);

    let fs = fs.create_file("/projects/site", "example.com").unwrap();
    assert_eq!(fs.read_file("/projects/site").unwrap(), "example.com");

    let fs = fs.change_directory("/projects").unwrap();
    let fs = fs.create_file("site2", "example.org").unwrap();
    assert_eq!(names(&fs, "."), ["site", "site2"]);

    assert!(matches!(
        fs.delete_directory("/projects", false),
        Err(VfsError::DirectoryNotEmpty(_))
    ));

    let fs = fs.delete_directory("/projects", true).unwrap();
    assert!(names(&fs, "/").is_empty());
    assert_eq!(fs.current_path(), "/");
}

#[test]
fn test_recursive_mkdir() {
    let fs = FileSystem::new();

    let nested = fs.create_directory("/a/b/c", true).unwrap();
    assert_eq!(names(&nested, "/"), ["a/"]);
    assert_eq!(names(&nested, "/a"), ["b/"]);
    assert_eq!(names(&nested, "/a/b"), ["c/"]);
    assert_eq!(nested.tree().reachable_count(), 4);

    let result = fs.create_directory("/a/b/c", false);
    assert!(matches!(result, Err(VfsError::NotFound(_))));
    assert!(names(&fs, "/").is_empty());
}

#[test]
fn test_mkdir_traverses_existing_parents_without_recursive() {
    let fs = FileSystem::new().create_directory("/a", false).unwrap();
    let fs = fs.create_directory("/a/b", false).unwrap();
    let fs = fs.create_directory("a/../c", false).unwrap();
    assert_eq!(names(&fs, "/"), ["a/", "c/"]);
    assert_eq!(names(&fs, "/a"), ["b/"]);
}

#[test]
fn test_mkdir_conflicts() {
    let fs = populated();

    assert!(matches!(
        fs.create_directory("/a", true),
        Err(VfsError::AlreadyExists(_))
    ));
    assert!(matches!(
        fs.create_directory("/a/file.txt", false),
        Err(VfsError::AlreadyExists(_))
    ));
    assert!(matches!(
        fs.create_directory("/a/file.txt/x", true),
        Err(VfsError::NotADirectory(_))
    ));
    assert!(matches!(
        fs.create_directory("/", true),
        Err(VfsError::AlreadyExists(_))
    ));
    assert!(matches!(
        fs.create_directory("/a/..", true),
        Err(VfsError::AlreadyExists(_))
    ));
    assert!(matches!(
        fs.create_directory("  ", true),
        Err(VfsError::InvalidPath(_))
    ));
}

#[test]
fn test_relative_mkdir_from_subdirectory() {
    let fs = populated().change_directory("/a/sub").unwrap();
    let fs = fs.create_directory("deep/er", true).unwrap();
    assert_eq!(fs.current_path(), "/a/sub");
    assert_eq!(names(&fs, "deep"), ["er/"]);
    assert_eq!(names(&fs, "/a/sub/deep"), ["er/"]);
}

#[test]
fn test_create_file_failures() {
    let fs = populated();

    assert!(matches!(
        fs.create_file("/a/file.txt", "other.com"),
        Err(VfsError::AlreadyExists(_))
    ));
    assert!(matches!(
        fs.create_file("/missing/x", "other.com"),
        Err(VfsError::NotFound(_))
    ));
    assert!(matches!(
        fs.create_file("/a/file.txt/x", "other.com"),
        Err(VfsError::NotADirectory(_))
    ));
    assert!(matches!(
        fs.create_file("/a/", "other.com"),
        Err(VfsError::InvalidPath(_))
    ));
    assert!(matches!(
        fs.create_file("/a/..", "other.com"),
        Err(VfsError::InvalidPath(_))
    ));
    assert!(matches!(
        fs.create_file("/a/new", ""),
        Err(VfsError::InvalidArgument(_))
    ));
    assert!(matches!(
        fs.create_file("/a/new", "   "),
        Err(VfsError::InvalidArgument(_))
    ));
}

#[test]
fn test_create_file_at_root_and_relative() {
    let fs = FileSystem::new().create_file("/top", "example.com").unwrap();
    let fs = fs.create_file("second", "example.org").unwrap();
    assert_eq!(names(&fs, "/"), ["second", "top"]);
}

#[test]
fn test_read_file_and_list_errors() {
    let fs = populated();

    assert!(matches!(fs.read_file("/a"), Err(VfsError::IsADirectory(_))));
    assert!(matches!(fs.read_file("/nope"), Err(VfsError::NotFound(_))));
    assert!(matches!(
        fs.list_directory("/a/file.txt"),
        Err(VfsError::NotADirectory(_))
    ));
    assert!(matches!(fs.list_directory("/nope"), Err(VfsError::NotFound(_))));
}

#[test]
fn test_change_directory() {
    let fs = populated();

    let moved = fs.change_directory("a/sub").unwrap();
    assert_eq!(moved.current_path(), "/a/sub");
    assert!(moved.shares_tree_with(&fs));

    let up = moved.change_directory("../..").unwrap();
    assert_eq!(up.current_path(), "/");

    assert!(matches!(
        fs.change_directory("/a/file.txt"),
        Err(VfsError::NotADirectory(_))
    ));
    assert!(matches!(
        fs.change_directory("/zzz"),
        Err(VfsError::NotFound(_))
    ));
}

#[test]
fn test_delete_file() {
    let fs = populated();

    let deleted = fs.delete_file("/a/file.txt").unwrap();
    assert_eq!(names(&deleted, "/a"), ["sub/"]);

    assert!(matches!(fs.delete_file("/a"), Err(VfsError::IsADirectory(_))));
    assert!(matches!(fs.delete_file("/"), Err(VfsError::IsADirectory(_))));
    assert!(matches!(
        fs.delete_file("/a/missing"),
        Err(VfsError::NotFound(_))
    ));
}

#[test]
fn test_delete_directory() {
    let fs = populated();

    assert!(matches!(
        fs.delete_directory("/a/file.txt", true),
        Err(VfsError::NotADirectory(_))
    ));
    assert!(matches!(
        fs.delete_directory("/", true),
        Err(VfsError::PermissionDenied(_))
    ));
    assert!(matches!(
        fs.delete_directory("..", true),
        Err(VfsError::PermissionDenied(_))
    ));

    let fs = fs.delete_directory("/b", false).unwrap();
    assert_eq!(names(&fs, "/"), ["a/"]);
}

#[test]
fn test_delete_directory_containing_cwd_falls_back_to_root() {
    let fs = populated().change_directory("/a/sub").unwrap();

    let fs = fs.delete_directory("/a", true).unwrap();
    assert_eq!(fs.current_path(), "/");
    assert_eq!(fs.current_directory(), fs.root());
    assert_eq!(names(&fs, "."), ["b/"]);
}

#[test]
fn test_delete_sibling_keeps_cwd() {
    let fs = populated().change_directory("/a/sub").unwrap();
    let fs = fs.delete_directory("/b", false).unwrap();
    assert_eq!(fs.current_path(), "/a/sub");
}

#[test]
fn test_stale_id_lookup_is_none() {
    let old = populated();
    let sub = old.resolve("/a/sub").unwrap();
    let new = old.delete_directory("/a", true).unwrap();

    assert!(new.node(sub).is_none());
    assert!(new.node_path(sub).is_none());
    assert!(!new.tree().contains(sub));
    assert!(old.tree().contains(sub));
}

#[test]
fn test_deleted_subtree_is_unreachable() {
    let fs = populated().delete_directory("/a", true).unwrap();
    assert_eq!(fs.tree().reachable_count(), 2);
    assert!(fs.resolve("/a/sub").is_none());
}

#[test]
fn test_copy_on_write_leaves_input_untouched() {
    let fs = populated();
    let before = names(&fs, "/a");

    let next = fs.delete_file("/a/file.txt").unwrap();
    let next = next.create_file("/a/other", "example.net").unwrap();
    let next = next.move_node("/a/sub", "/b").unwrap();

    assert!(!next.shares_tree_with(&fs));
    assert_eq!(names(&fs, "/a"), before);
    assert_eq!(fs.read_file("/a/file.txt").unwrap(), "example.com");
    assert!(names(&fs, "/b").is_empty());
    assert_eq!(names(&next, "/a"), ["other"]);
    assert_eq!(names(&next, "/b"), ["sub/"]);
}

#[test]
fn test_failed_operation_leaves_input_untouched() {
    let fs = populated();
    let result = fs.create_directory("/b/x/y/../../../a", true);
    assert!(matches!(result, Err(VfsError::AlreadyExists(_))));
    assert!(names(&fs, "/b").is_empty());
}

#[test]
fn test_move_file_into_directory_keeps_name() {
    let fs = populated().change_directory("/a").unwrap();

    let fs = fs.move_node("/a/file.txt", "/b").unwrap();
    assert_eq!(names(&fs, "/b"), ["file.txt"]);
    assert_eq!(names(&fs, "/a"), ["sub/"]);
    assert_eq!(fs.current_path(), "/a");
    assert_eq!(fs.read_file("/b/file.txt").unwrap(), "example.com");
}

#[test]
fn test_move_renames() {
    let fs = populated();

    let fs = fs.move_node("/a/file.txt", "/b/renamed").unwrap();
    assert_eq!(names(&fs, "/b"), ["renamed"]);
    let node = fs.resolve("/b/renamed").unwrap();
    assert_eq!(fs.node(node).unwrap().name(), "renamed");

    let fs = fs.move_node("b/renamed", "again").unwrap();
    assert_eq!(names(&fs, "/"), ["a/", "again", "b/"]);
}

#[test]
fn test_move_directory_rebases_cwd() {
    let fs = populated().change_directory("/a/sub").unwrap();

    let fs = fs.move_node("/a", "/b/moved").unwrap();
    assert_eq!(fs.current_path(), "/b/moved/sub");
    assert_eq!(names(&fs, "/b/moved"), ["file.txt", "sub/"]);

    let parent = fs.resolve("..").unwrap();
    assert_eq!(fs.node_path(parent).as_deref(), Some("/b/moved"));
}

#[test]
fn test_move_cycle_is_rejected() {
    let fs = populated();

    assert!(matches!(
        fs.move_node("/a", "/a/sub"),
        Err(VfsError::Cycle(_))
    ));
    assert!(matches!(
        fs.move_node("/a", "/a/sub/new"),
        Err(VfsError::Cycle(_))
    ));
    assert!(matches!(fs.move_node("/a", "/a"), Err(VfsError::Cycle(_))));
}

#[test]
fn test_move_conflicts() {
    let fs = populated().create_file("/b/file.txt", "example.org").unwrap();

    assert!(matches!(
        fs.move_node("/a/file.txt", "/b"),
        Err(VfsError::AlreadyExists(_))
    ));
    assert!(matches!(
        fs.move_node("/a/sub", "/b/file.txt"),
        Err(VfsError::AlreadyExists(_))
    ));
    assert!(matches!(
        fs.move_node("/", "/b"),
        Err(VfsError::PermissionDenied(_))
    ));
    assert!(matches!(
        fs.move_node("/missing", "/b"),
        Err(VfsError::NotFound(_))
    ));
    assert!(matches!(
        fs.move_node("/a/sub", "/nowhere/sub"),
        Err(VfsError::NotFound(_))
    ));
}

#[test]
fn test_move_to_same_place_is_a_noop() {
    let fs = populated();

    let same = fs.move_node("/a/file.txt", "/a").unwrap();
    assert!(same.shares_tree_with(&fs));

    let same = fs.move_node("/a/sub", "/a/sub/..").unwrap();
    assert!(same.shares_tree_with(&fs));
}

#[test]
fn test_node_path_round_trips() {
    let fs = populated().change_directory("/a").unwrap();

    for (path, canonical) in [
        ("sub", "/a/sub"),
        ("./sub/../file.txt", "/a/file.txt"),
        ("../b/", "/b"),
        ("/", "/"),
    ] {
        let id = fs.resolve(path).unwrap();
        assert_eq!(fs.node_path(id).as_deref(), Some(canonical));
    }
}

#[test]
fn test_variant_predicates() {
    let fs = populated();
    let dir_id = fs.resolve("/a").unwrap();
    let file = fs.node(fs.resolve("/a/file.txt").unwrap()).unwrap();
    let dir = fs.node(dir_id).unwrap();

    assert_eq!(is_file(file).map(|f| f.url()), Some("example.com"));
    assert!(is_directory(file).is_none());
    assert!(is_directory(dir).is_some());
    assert_eq!(fs.tree().children(dir_id).count(), 2);
    assert!(is_file(dir).is_none());
}

#[test]
fn test_parent_links_are_consistent() {
    let fs = populated()
        .move_node("/a/sub", "/b/sub2")
        .unwrap()
        .create_file("/b/sub2/x", "example.com")
        .unwrap();
    let tree = fs.tree();

    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        for child in tree.children(id) {
            let node = tree.get(child).unwrap();
            assert_eq!(tree.parent(child), Some(id));
            assert_eq!(tree.child(id, node.name()), Some(child));
            stack.push(child);
        }
    }
    assert_eq!(tree.parent(tree.root()), None);
    assert_eq!(tree.reachable_count(), 6);
}
