//! In-memory vector collaborator: embeds documents once per rebuild and
//! answers queries with exhaustive cosine search.
pub mod store;

pub use store::{matches_filter, MemoryVectorStore};
