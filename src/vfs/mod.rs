//! Virtual filesystem core: arena tree, path resolution and copy-on-write
//! mutations.

mod fs;
mod resolve;
mod tree;

#[cfg(test)]
mod tests;

pub use fs::FileSystem;
pub use resolve::resolve_path;
pub use tree::Tree;
