//! Weighted Reciprocal Rank Fusion.
//!
//! Each list contributes `weight / (k + rank)` per document, with 1-based
//! ranks. Raw retriever scores are ignored, which makes BM25 values and
//! cosine similarities directly combinable.
use std::collections::{HashMap, HashSet};

use lawdb_core::config::SearchSettings;
use lawdb_core::types::{ChunkId, Meta, ScoredCandidate, ScoredHit, SourceKind, VectorHit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub vector: f64,
    pub lexical: f64,
    pub k: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self { vector: 0.7, lexical: 0.3, k: 60.0 }
    }
}

impl From<&SearchSettings> for FusionWeights {
    fn from(s: &SearchSettings) -> Self {
        Self { vector: s.vector_weight, lexical: s.bm25_weight, k: s.rrf_k }
    }
}

impl FusionWeights {
    pub fn weight(&self, source: SourceKind) -> f64 {
        match source {
            SourceKind::Vector => self.vector,
            SourceKind::Lexical => self.lexical,
        }
    }

    pub fn contribution(&self, source: SourceKind, rank: usize) -> f64 {
        self.weight(source) / (self.k + rank as f64)
    }
}

#[derive(Default)]
struct Merger {
    candidates: Vec<ScoredCandidate>,
    position: HashMap<ChunkId, usize>,
}

impl Merger {
    fn add_list<'a>(
        &mut self,
        weights: &FusionWeights,
        source: SourceKind,
        items: impl Iterator<Item = (&'a ChunkId, &'a String, &'a Meta)>,
    ) {
        let mut seen: HashSet<&ChunkId> = HashSet::new();
        let mut rank = 0;
        for (id, content, metadata) in items {
            // a document counts once per list, at its best rank
            if !seen.insert(id) {
                continue;
            }
            rank += 1;
            let contribution = weights.contribution(source, rank);
            let idx = match self.position.get(id) {
                Some(&idx) => idx,
                None => {
                    self.position.insert(id.clone(), self.candidates.len());
                    self.candidates.push(ScoredCandidate::new(id.clone(), content.clone(), metadata.clone()));
                    self.candidates.len() - 1
                }
            };
            let candidate = &mut self.candidates[idx];
            match source {
                SourceKind::Vector => candidate.vector_contribution += contribution,
                SourceKind::Lexical => candidate.lexical_contribution += contribution,
            }
            candidate.fusion_score = candidate.vector_contribution + candidate.lexical_contribution;
            candidate.final_score = candidate.fusion_score;
        }
    }
}

/// Merges both rankings into candidates sorted by descending fusion score.
/// Ties keep first-seen order, vector list first.
pub fn fuse(vector: &[VectorHit], lexical: &[ScoredHit], weights: &FusionWeights) -> Vec<ScoredCandidate> {
    let mut merger = Merger::default();
    merger.add_list(weights, SourceKind::Vector, vector.iter().map(|h| (&h.id, &h.content, &h.metadata)));
    merger.add_list(weights, SourceKind::Lexical, lexical.iter().map(|h| (&h.id, &h.content, &h.metadata)));
    let mut candidates = merger.candidates;
    candidates.sort_by(|a, b| b.fusion_score.total_cmp(&a.fusion_score));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(id: &str, score: f32) -> VectorHit {
        VectorHit { id: id.into(), content: String::new(), metadata: Meta::new(), similarity_score: score }
    }

    fn l(id: &str, score: f64) -> ScoredHit {
        ScoredHit { id: id.into(), content: String::new(), metadata: Meta::new(), score }
    }

    #[test]
    fn rank_one_in_both_lists() {
        let fused = fuse(&[v("a", 0.9)], &[l("a", 12.0)], &FusionWeights::default());
        assert_eq!(fused.len(), 1);
        assert!((fused[0].fusion_score - 1.0 / 61.0).abs() < 1e-12);
        assert!((fused[0].vector_contribution - 0.7 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn lexical_only_rank_one() {
        let fused = fuse(&[], &[l("a", 3.0)], &FusionWeights::default());
        assert!((fused[0].fusion_score - 0.3 / 61.0).abs() < 1e-12);
        assert_eq!(fused[0].vector_contribution, 0.0);
    }

    #[test]
    fn duplicates_within_a_list_count_once() {
        let fused = fuse(&[v("a", 0.9), v("b", 0.8), v("a", 0.1)], &[], &FusionWeights::default());
        assert_eq!(fused.len(), 2);
        assert!((fused[0].fusion_score - 0.7 / 61.0).abs() < 1e-12);
        assert!((fused[1].fusion_score - 0.7 / 62.0).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_vector_order_first() {
        let weights = FusionWeights { vector: 0.5, lexical: 0.5, k: 60.0 };
        let fused = fuse(&[v("v1", 0.5)], &[l("l1", 1.0)], &weights);
        let ids: Vec<&str> = fused.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "l1"]);
    }
}
