use serde::Deserialize;

use lawdb_core::error::{Error, Result};
use lawdb_core::types::Meta;

pub const MAX_QUERY_CHARS: usize = 500;
pub const MIN_TOP_K: usize = 1;
pub const MAX_TOP_K: usize = 100;
pub const DEFAULT_TOP_K: usize = 10;

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

/// A search request as received from a caller. Only [`SearchRequest::validated`]
/// output reaches the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub filters: Option<Meta>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, top_k: usize) -> Result<Self> {
        Self { query: query.into(), top_k, filters: None }.validated()
    }

    pub fn with_filters(mut self, filters: Option<Meta>) -> Self {
        self.filters = filters.filter(|f| !f.is_empty());
        self
    }

    /// Trims the query, rejects empty or over-long text and clamps `top_k`
    /// into `[1, 100]`.
    pub fn validated(mut self) -> Result<Self> {
        let trimmed = self.query.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("query must not be empty".into()));
        }
        let chars = trimmed.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(Error::Validation(format!("query is {chars} characters, the limit is {MAX_QUERY_CHARS}")));
        }
        self.query = trimmed.to_string();
        self.top_k = self.top_k.clamp(MIN_TOP_K, MAX_TOP_K);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_clamps() {
        let req = SearchRequest::new("  수소 안전  ", 0).expect("valid");
        assert_eq!(req.query, "수소 안전");
        assert_eq!(req.top_k, 1);
        assert_eq!(SearchRequest::new("수소", 1000).expect("valid").top_k, 100);
    }

    #[test]
    fn length_limit_counts_characters() {
        assert!(SearchRequest::new("가".repeat(500), 10).is_ok());
        assert!(matches!(SearchRequest::new("가".repeat(501), 10), Err(Error::Validation(_))));
        assert!(matches!(SearchRequest::new(" \t ", 10), Err(Error::Validation(_))));
    }

    #[test]
    fn deserializes_with_defaults() {
        let req: SearchRequest = serde_json::from_str(r#"{"query":"수소"}"#).expect("json");
        assert_eq!(req.top_k, DEFAULT_TOP_K);
        assert!(req.filters.is_none());
    }
}
