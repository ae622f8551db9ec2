use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use lawdb_core::config::SearchSettings;
use lawdb_core::error::{Error, Result};
use lawdb_core::traits::VectorSearch;
use lawdb_core::types::{IndexedDocument, Meta, VectorHit};
use lawdb_text::{normalize, LexicalIndex, LexicalSnapshot};

use crate::fusion::{fuse, FusionWeights};
use crate::request::SearchRequest;
use crate::rerank::rerank;
use crate::response::SearchResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    /// No snapshot has been published; searches fail with `NotReady`.
    Uninitialized,
    Ready,
    /// A rebuild is in progress; the previous snapshot (if any) keeps serving.
    Rebuilding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub indexed: usize,
    pub skipped: usize,
    /// Documents embedded by the vector collaborator, `None` when lexical-only.
    pub embedded: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub state: EngineState,
    pub documents: usize,
    pub skipped_documents: usize,
    pub semantic_search: bool,
    pub embedding_dimension: Option<usize>,
}

/// Clears the rebuilding flag however the rebuild ends.
struct RebuildingGuard<'a>(&'a AtomicBool);

impl<'a> RebuildingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RebuildingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct HybridSearchEngine {
    lexical: LexicalIndex,
    vector: Option<Arc<dyn VectorSearch>>,
    weights: FusionWeights,
    vector_timeout: Duration,
    rebuild_gate: Mutex<()>,
    rebuilding: AtomicBool,
}

impl HybridSearchEngine {
    /// `vector = None` runs the engine lexical-only.
    pub fn new(settings: &SearchSettings, vector: Option<Arc<dyn VectorSearch>>) -> Self {
        Self {
            lexical: LexicalIndex::new(),
            vector,
            weights: FusionWeights::from(settings),
            vector_timeout: Duration::from_millis(settings.vector_timeout_ms),
            rebuild_gate: Mutex::new(()),
            rebuilding: AtomicBool::new(false),
        }
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    pub fn state(&self) -> EngineState {
        if self.rebuilding.load(Ordering::SeqCst) {
            EngineState::Rebuilding
        } else if self.lexical.snapshot().is_some() {
            EngineState::Ready
        } else {
            EngineState::Uninitialized
        }
    }

    pub fn stats(&self) -> EngineStats {
        let snapshot = self.lexical.snapshot();
        EngineStats {
            state: self.state(),
            documents: snapshot.as_ref().map_or(0, |s| s.len()),
            skipped_documents: snapshot.as_ref().map_or(0, |s| s.report().skipped),
            semantic_search: self.vector.is_some(),
            embedding_dimension: self.vector.as_ref().map(|v| v.dim()),
        }
    }

    /// Replaces the indexed corpus. The new lexical snapshot and the vector
    /// index are built off to the side; the lexical swap happens only after
    /// both succeeded, otherwise the previous snapshot keeps serving.
    pub async fn rebuild(&self, documents: Vec<IndexedDocument>) -> Result<RebuildReport> {
        let _gate = self.rebuild_gate.lock().await;
        let _rebuilding = RebuildingGuard::set(&self.rebuilding);
        let started = Instant::now();

        let vector = self.vector.clone();
        let built = tokio::task::spawn_blocking(move || -> Result<(LexicalSnapshot, Option<usize>)> {
            let snapshot = LexicalSnapshot::build(documents)?;
            let embedded = match &vector {
                Some(v) => Some(
                    v.index(snapshot.documents())
                        .map_err(|e| Error::Rebuild(format!("vector index: {e:#}")))?,
                ),
                None => None,
            };
            Ok((snapshot, embedded))
        })
        .await
        .map_err(|e| Error::Operation(format!("rebuild task failed: {e}")))?;

        let (snapshot, embedded) = match built {
            Ok(built) => built,
            Err(e) => {
                warn!(error = %e, "rebuild failed, keeping previous snapshot");
                return Err(e);
            }
        };
        let report = snapshot.report();
        self.lexical.publish(Arc::new(snapshot));
        info!(
            indexed = report.indexed,
            skipped = report.skipped,
            embedded = ?embedded,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index rebuilt"
        );
        Ok(RebuildReport { indexed: report.indexed, skipped: report.skipped, embedded })
    }

    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filters: Option<Meta>,
    ) -> Result<SearchResponse> {
        let request = SearchRequest::new(query, top_k)?.with_filters(filters);
        self.run(&request).await
    }

    /// Runs a caller-supplied request, e.g. one deserialized at a service
    /// boundary. The request is validated before any index access.
    pub async fn execute(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let request = request.clone().validated()?;
        self.run(&request).await
    }

    /// Expects a request that went through [`SearchRequest::validated`].
    async fn run(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let started = Instant::now();
        let snapshot = self.lexical.snapshot().ok_or(Error::NotReady)?;
        let query = normalize(&request.query);
        let fetch_k = request.top_k * 2;

        let (vector_hits, lexical_hits) = tokio::join!(
            self.fetch_vector(&request.query, fetch_k, request.filters.clone()),
            async { snapshot.search(&request.query, fetch_k) }
        );

        let mut candidates = fuse(&vector_hits, &lexical_hits, &self.weights);
        rerank(&mut candidates, &request.query);
        candidates.truncate(request.top_k);

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            vector = vector_hits.len(),
            lexical = lexical_hits.len(),
            returned = candidates.len(),
            elapsed_ms,
            "search"
        );
        Ok(SearchResponse::assemble(
            &request.query,
            query.keywords,
            candidates,
            &self.weights,
            elapsed_ms,
        ))
    }

    /// Vector hits, or an empty list when the collaborator is missing,
    /// fails or exceeds the timeout.
    async fn fetch_vector(&self, query: &str, k: usize, filters: Option<Meta>) -> Vec<VectorHit> {
        let Some(vector) = self.vector.clone() else {
            return Vec::new();
        };
        let query = query.to_string();
        let task = tokio::task::spawn_blocking(move || vector.search(&query, k, filters.as_ref()));
        match tokio::time::timeout(self.vector_timeout, task).await {
            Ok(Ok(Ok(hits))) => hits,
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "vector search failed, continuing lexical-only");
                Vec::new()
            }
            Ok(Err(e)) => {
                warn!(error = %e, "vector search task panicked, continuing lexical-only");
                Vec::new()
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.vector_timeout.as_millis() as u64,
                    "vector search timed out, continuing lexical-only"
                );
                Vec::new()
            }
        }
    }
}
