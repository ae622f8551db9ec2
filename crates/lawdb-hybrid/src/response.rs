use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use lawdb_core::types::{meta_str, ScoredCandidate};

use crate::fusion::FusionWeights;

pub const SEARCH_METHOD: &str = "hybrid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub total_found: usize,
    pub keywords: Vec<String>,
    pub relevant_laws: BTreeSet<String>,
    pub articles: Vec<ArticleResult>,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleResult {
    pub id: String,
    pub law_name: String,
    pub article_number: String,
    pub title: String,
    pub content: String,
    pub highlighted_content: String,
    /// Cross-reference expansion is not performed; always empty.
    pub related_articles: Vec<BTreeMap<String, String>>,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub search_time_ms: f64,
    pub llm_used: bool,
    pub search_method: String,
    pub vector_weight: f64,
    pub bm25_weight: f64,
}

/// Wraps every occurrence of each keyword in `<mark>` tags, one keyword
/// after another. Later keywords are matched against already-marked text,
/// so overlapping keywords can nest tags.
pub fn highlight(content: &str, keywords: &[String]) -> String {
    let mut out = content.to_string();
    for kw in keywords.iter().filter(|k| !k.is_empty()) {
        out = out.replace(kw.as_str(), &format!("<mark>{kw}</mark>"));
    }
    out
}

impl ArticleResult {
    pub fn from_candidate(candidate: ScoredCandidate, keywords: &[String]) -> Self {
        let meta = &candidate.metadata;
        Self {
            law_name: meta_str(meta, "law_name").to_string(),
            article_number: meta_str(meta, "article_number").to_string(),
            title: meta_str(meta, "title").to_string(),
            highlighted_content: highlight(&candidate.content, keywords),
            related_articles: Vec::new(),
            relevance_score: candidate.final_score,
            id: candidate.id,
            content: candidate.content,
        }
    }
}

impl SearchResponse {
    pub fn assemble(
        query: &str,
        keywords: Vec<String>,
        candidates: Vec<ScoredCandidate>,
        weights: &FusionWeights,
        search_time_ms: f64,
    ) -> Self {
        let articles: Vec<ArticleResult> =
            candidates.into_iter().map(|c| ArticleResult::from_candidate(c, &keywords)).collect();
        let relevant_laws = articles.iter().filter(|a| !a.law_name.is_empty()).map(|a| a.law_name.clone()).collect();
        Self {
            query: query.to_string(),
            total_found: articles.len(),
            keywords,
            relevant_laws,
            articles,
            metadata: ResponseMetadata {
                search_time_ms,
                llm_used: false,
                search_method: SEARCH_METHOD.to_string(),
                vector_weight: weights.vector,
                bm25_weight: weights.lexical,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kws(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn marks_every_occurrence() {
        assert_eq!(highlight("수소 및 수소", &kws(&["수소"])), "<mark>수소</mark> 및 <mark>수소</mark>");
        assert_eq!(highlight("안전", &kws(&["수소"])), "안전");
    }

    #[test]
    fn overlapping_keywords_nest() {
        assert_eq!(
            highlight("수소충전소", &kws(&["수소충전소", "수소"])),
            "<mark><mark>수소</mark>충전소</mark>"
        );
    }
}
