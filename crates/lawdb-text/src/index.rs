use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use lawdb_core::error::{Error, Result};
use lawdb_core::types::{IndexedDocument, ScoredHit};

use crate::bm25::Bm25Index;
use crate::{fallback, query};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildReport {
    pub indexed: usize,
    pub skipped: usize,
}

/// An immutable, fully built lexical index over one corpus version.
#[derive(Debug)]
pub struct LexicalSnapshot {
    documents: Vec<IndexedDocument>,
    bm25: Option<Bm25Index>,
    report: BuildReport,
}

impl LexicalSnapshot {
    /// Builds a snapshot, skipping documents with a blank or repeated id.
    ///
    /// Fails only when documents were supplied and none of them is usable.
    pub fn build(documents: Vec<IndexedDocument>) -> Result<Self> {
        let supplied = documents.len();
        let mut seen = HashSet::with_capacity(supplied);
        let mut kept = Vec::with_capacity(supplied);
        for doc in documents {
            if doc.id.trim().is_empty() {
                warn!("skipping document without id");
                continue;
            }
            if !seen.insert(doc.id.clone()) {
                warn!(id = %doc.id, "skipping duplicate document id");
                continue;
            }
            kept.push(doc);
        }
        let report = BuildReport { indexed: kept.len(), skipped: supplied - kept.len() };
        if supplied > 0 && kept.is_empty() {
            return Err(Error::Rebuild(format!("none of the {supplied} documents could be indexed")));
        }

        let bm25 = if kept.is_empty() {
            None
        } else {
            let corpus: Vec<Vec<String>> = kept.iter().map(|d| query::tokenize(&d.content)).collect();
            Some(Bm25Index::build(&corpus))
        };
        Ok(Self { documents: kept, bm25, report })
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[IndexedDocument] {
        &self.documents
    }

    /// BM25 hits with a positive score, topped up with substring hits when
    /// fewer than `top_k` were found. BM25 hits always come first.
    pub fn search(&self, query_text: &str, top_k: usize) -> Vec<ScoredHit> {
        if top_k == 0 {
            return Vec::new();
        }
        let mut ranked: Vec<(usize, f64)> = match &self.bm25 {
            Some(bm25) => {
                let scores = bm25.scores(&query::tokenize(query_text));
                let mut positive: Vec<(usize, f64)> =
                    scores.into_iter().enumerate().filter(|(_, s)| *s > 0.0).collect();
                positive.sort_by(|a, b| b.1.total_cmp(&a.1));
                positive.truncate(top_k);
                positive
            }
            None => Vec::new(),
        };
        let primary = ranked.len();

        if ranked.len() < top_k {
            let mut present: HashSet<usize> = ranked.iter().map(|(i, _)| *i).collect();
            for (i, s) in fallback::substring_search(&self.documents, query_text, top_k) {
                if ranked.len() >= top_k {
                    break;
                }
                if present.insert(i) {
                    ranked.push((i, s));
                }
            }
        }
        debug!(primary, fallback = ranked.len() - primary, "lexical search");

        ranked
            .into_iter()
            .map(|(i, score)| {
                let doc = &self.documents[i];
                ScoredHit { id: doc.id.clone(), content: doc.content.clone(), metadata: doc.metadata.clone(), score }
            })
            .collect()
    }
}

/// Handle to the currently published snapshot.
///
/// Readers clone the `Arc` and search without holding the lock; a rebuild
/// constructs the replacement off to the side and swaps the pointer.
#[derive(Debug, Default)]
pub struct LexicalIndex {
    current: RwLock<Option<Arc<LexicalSnapshot>>>,
}

impl LexicalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Arc<LexicalSnapshot>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn publish(&self, snapshot: Arc<LexicalSnapshot>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// Replaces the whole index. On error the previous snapshot stays published.
    pub fn build(&self, documents: Vec<IndexedDocument>) -> Result<BuildReport> {
        let snapshot = LexicalSnapshot::build(documents)?;
        let report = snapshot.report();
        self.publish(Arc::new(snapshot));
        info!(indexed = report.indexed, skipped = report.skipped, "lexical index published");
        Ok(report)
    }

    /// Searches the current snapshot; an index that was never built only
    /// has the (empty) substring fallback to offer.
    pub fn search(&self, query_text: &str, top_k: usize) -> Vec<ScoredHit> {
        match self.snapshot() {
            Some(snapshot) => snapshot.search(query_text, top_k),
            None => Vec::new(),
        }
    }
}
