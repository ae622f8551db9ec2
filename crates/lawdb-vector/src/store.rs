use anyhow::{bail, Result};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use lawdb_core::traits::{Embedder, VectorSearch};
use lawdb_core::types::{IndexedDocument, Meta, VectorHit};
use lawdb_embed::cosine_similarity;

const DEFAULT_BATCH_SIZE: usize = 64;

struct Entry {
    doc: IndexedDocument,
    vector: Vec<f32>,
}

pub struct MemoryVectorStore {
    embedder: Box<dyn Embedder>,
    entries: RwLock<Arc<Vec<Entry>>>,
    batch_size: usize,
    progress: Option<ProgressBar>,
}

impl MemoryVectorStore {
    pub fn new(embedder: Box<dyn Embedder>) -> Self {
        Self { embedder, entries: RwLock::new(Arc::new(Vec::new())), batch_size: DEFAULT_BATCH_SIZE, progress: None }
    }

    /// Reports embedding progress on `pb` during every re-index.
    pub fn with_progress(mut self, pb: ProgressBar) -> Self {
        self.progress = Some(pb);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.current().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embeds `documents` and replaces the stored set once every batch has
    /// succeeded. Blank and repeated ids are skipped, as in the lexical index.
    fn embed_all(&self, documents: &[IndexedDocument]) -> Result<usize> {
        let mut seen = HashSet::new();
        let docs: Vec<&IndexedDocument> =
            documents.iter().filter(|d| !d.id.trim().is_empty() && seen.insert(d.id.as_str())).collect();
        if let Some(pb) = &self.progress {
            pb.set_length(docs.len() as u64);
            pb.set_position(0);
        }

        let mut entries = Vec::with_capacity(docs.len());
        for batch in docs.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != batch.len() {
                bail!("embedder returned {} vectors for {} documents", vectors.len(), batch.len());
            }
            for (doc, vector) in batch.iter().zip(vectors) {
                if vector.len() != self.embedder.dim() {
                    bail!("vector for {} has dimension {}, expected {}", doc.id, vector.len(), self.embedder.dim());
                }
                entries.push(Entry { doc: (*doc).clone(), vector });
            }
            if let Some(pb) = &self.progress {
                pb.inc(batch.len() as u64);
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_with_message("embedded");
        }
        let count = entries.len();
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(entries);
        info!(count, "vector store rebuilt");
        Ok(count)
    }

    fn current(&self) -> Arc<Vec<Entry>> {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }
}

/// True when every filter entry equals the document's metadata value.
pub fn matches_filter(metadata: &Meta, filter: Option<&Meta>) -> bool {
    filter.map_or(true, |f| f.iter().all(|(k, v)| metadata.get(k) == Some(v)))
}

impl VectorSearch for MemoryVectorStore {
    fn search(&self, query: &str, k: usize, filter: Option<&Meta>) -> Result<Vec<VectorHit>> {
        let entries = self.current();
        if k == 0 || entries.is_empty() {
            return Ok(Vec::new());
        }
        let q = self.embedder.embed_query(query)?;
        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| matches_filter(&e.doc.metadata, filter))
            .map(|(i, e)| (i, cosine_similarity(&q, &e.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        debug!(hits = scored.len(), "vector search");

        Ok(scored
            .into_iter()
            .map(|(i, similarity_score)| {
                let doc = &entries[i].doc;
                VectorHit {
                    id: doc.id.clone(),
                    content: doc.content.clone(),
                    metadata: doc.metadata.clone(),
                    similarity_score,
                }
            })
            .collect())
    }

    fn index(&self, documents: &[IndexedDocument]) -> Result<usize> {
        self.embed_all(documents)
    }

    fn dim(&self) -> usize {
        self.embedder.dim()
    }
}
