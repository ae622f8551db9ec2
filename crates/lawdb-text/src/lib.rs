//! lawdb-text
//!
//! Lexical side of the hybrid engine: the Korean query normalizer, an
//! in-memory Okapi BM25 index with a substring fallback, and the
//! snapshot-swapped index handle the engine searches against.
pub mod bm25;
pub mod fallback;
pub mod index;
pub mod query;

pub use index::{BuildReport, LexicalIndex, LexicalSnapshot};
pub use query::{normalize, Query};
