//! Embedding providers for the vector collaborator.
//!
//! `FakeEmbedder` hashes tokens into a fixed-size vector and needs no model;
//! `HttpEmbedder` talks to an OpenAI-compatible `/v1/embeddings` endpoint.
//! Both return L2-normalized vectors.
use anyhow::Result;
use tracing::info;

use lawdb_core::config::{EmbeddingProviderKind, EmbeddingSettings};
use lawdb_core::traits::Embedder;

pub mod fake;
pub mod http;

pub use fake::FakeEmbedder;
pub use http::HttpEmbedder;

/// Builds the configured embedder. `Ok(None)` means semantic search is
/// switched off and the engine should run lexical-only.
pub fn get_default_embedder(settings: &EmbeddingSettings) -> Result<Option<Box<dyn Embedder>>> {
    match settings.provider {
        EmbeddingProviderKind::Fake => {
            info!(dim = settings.dimension, "using fake embedder");
            Ok(Some(Box::new(FakeEmbedder::new(settings.dimension))))
        }
        EmbeddingProviderKind::Http => {
            let embedder = HttpEmbedder::new(settings)?;
            info!(url = %embedder.url(), model = %settings.model, "using http embedder");
            Ok(Some(Box::new(embedder)))
        }
        EmbeddingProviderKind::Disabled => {
            info!("embeddings disabled");
            Ok(None)
        }
    }
}

/// Cosine similarity in `[-1, 1]`; zero when either vector has no length
/// or the dimensions differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0f32, 0f32, 0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na.sqrt() * nb.sqrt())).clamp(-1.0, 1.0)
}

/// Embeds both texts and returns their cosine similarity.
pub fn text_similarity(embedder: &dyn Embedder, a: &str, b: &str) -> Result<f32> {
    let vectors = embedder.embed_batch(&[a.to_string(), b.to_string()])?;
    match vectors.as_slice() {
        [va, vb] => Ok(cosine_similarity(va, vb)),
        other => anyhow::bail!("expected 2 vectors, embedder returned {}", other.len()),
    }
}

pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
    for x in v {
        *x /= norm;
    }
}
