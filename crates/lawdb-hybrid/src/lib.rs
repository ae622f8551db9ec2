//! Hybrid retrieval: both retrievers are queried, their rankings combined
//! with weighted Reciprocal Rank Fusion and adjusted by rule bonuses.
pub mod engine;
pub mod fusion;
pub mod request;
pub mod rerank;
pub mod response;

pub use engine::{EngineState, EngineStats, HybridSearchEngine, RebuildReport};
pub use fusion::FusionWeights;
pub use request::SearchRequest;
pub use response::{ArticleResult, ResponseMetadata, SearchResponse};
