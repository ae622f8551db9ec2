//! Shared building blocks for the statute search workspace.
//!
//! Holds the domain types, the collaborator traits consumed by the hybrid
//! engine, the error taxonomy, the figment-backed configuration and the
//! chunking/ingestion pipeline that produces indexable documents.
pub mod chunker;
pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;
