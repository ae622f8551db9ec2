use crate::types::{IndexedDocument, Meta, VectorHit};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed_query(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector for the query"))
    }
}

/// Semantic retrieval collaborator consumed by the hybrid engine.
///
/// Results are ordered by descending `similarity_score`. `filter` restricts
/// hits to documents whose metadata matches every filter entry.
pub trait VectorSearch: Send + Sync {
    fn search(
        &self,
        query: &str,
        k: usize,
        filter: Option<&Meta>,
    ) -> anyhow::Result<Vec<VectorHit>>;

    /// Replaces the stored documents. On error the previous set stays searchable.
    fn index(&self, documents: &[IndexedDocument]) -> anyhow::Result<usize>;

    /// Dimensionality of the stored vectors.
    fn dim(&self) -> usize;
}
