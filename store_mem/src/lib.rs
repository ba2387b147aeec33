//! In-memory storage backend — thread-safe, for tests and the CLI harness.

mod store;
mod trigram;

pub use store::MemoryStore;
pub use trigram::trigram_similarity;
