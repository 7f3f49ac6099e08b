//! In-memory snapshot store, for tests and `--in-memory` sessions.

mod store;

pub use store::MemoryStore;
