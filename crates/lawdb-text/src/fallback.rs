//! Substring matching used when BM25 comes back short.
//!
//! Korean compounds (`수소충전소`) rarely appear verbatim as whitespace
//! tokens, so tokens of four or more characters are also decomposed into
//! every 2-character window. Whole query tokens weigh more than fragments.
use lawdb_core::types::IndexedDocument;

pub const WHOLE_TOKEN_WEIGHT: f64 = 3.0;
pub const FRAGMENT_WEIGHT: f64 = 1.0;
const MIN_KEYWORD_CHARS: usize = 2;
const DECOMPOSE_MIN_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    pub text: String,
    pub weight: f64,
}

/// Every 2-character window of `word`, or nothing for words shorter than four characters.
pub fn decompose(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() < DECOMPOSE_MIN_CHARS {
        return Vec::new();
    }
    chars.windows(2).map(|w| w.iter().collect()).collect()
}

/// Distinct keywords in first-seen order. A fragment that is also a whole
/// query token keeps the whole-token weight.
pub fn keywords(query: &str) -> Vec<Keyword> {
    let raw: Vec<&str> = query.split_whitespace().collect();
    let mut keywords: Vec<Keyword> = Vec::new();
    for token in &raw {
        let candidates = std::iter::once(token.to_string()).chain(decompose(token));
        for text in candidates {
            if text.chars().count() < MIN_KEYWORD_CHARS || keywords.iter().any(|k| k.text == text) {
                continue;
            }
            let weight = if raw.contains(&text.as_str()) { WHOLE_TOKEN_WEIGHT } else { FRAGMENT_WEIGHT };
            keywords.push(Keyword { text, weight });
        }
    }
    keywords
}

/// Sum of non-overlapping occurrence counts times keyword weight.
pub fn score(content: &str, keywords: &[Keyword]) -> f64 {
    keywords.iter().map(|k| content.matches(k.text.as_str()).count() as f64 * k.weight).sum()
}

/// Positive-scoring documents as `(position, score)`, best first; ties keep corpus order.
pub fn substring_search(documents: &[IndexedDocument], query: &str, top_k: usize) -> Vec<(usize, f64)> {
    let keywords = keywords(query);
    if keywords.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(usize, f64)> = documents
        .iter()
        .enumerate()
        .map(|(i, doc)| (i, score(&doc.content, &keywords)))
        .filter(|(_, s)| *s > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_long_compounds_only() {
        assert_eq!(decompose("수소충전소"), vec!["수소", "소충", "충전", "전소"]);
        assert!(decompose("충전소").is_empty());
    }

    #[test]
    fn keyword_weights() {
        let kws = keywords("수소충전소 안전 수소 가");
        let find = |t: &str| kws.iter().find(|k| k.text == t).map(|k| k.weight);
        assert_eq!(find("수소충전소"), Some(WHOLE_TOKEN_WEIGHT));
        assert_eq!(find("충전"), Some(FRAGMENT_WEIGHT));
        // also a whole token of the query
        assert_eq!(find("수소"), Some(WHOLE_TOKEN_WEIGHT));
        assert_eq!(find("가"), None);
        assert_eq!(kws.iter().filter(|k| k.text == "수소").count(), 1);
    }

    #[test]
    fn scores_count_occurrences() {
        let kws = keywords("수소충전소 안전");
        assert_eq!(score("수소충전소 설치 기준에 관한 규정", &kws), 7.0);
        assert_eq!(score("수소 저장소 안전 관리 기준", &kws), 4.0);
        assert_eq!(score("무관한 문장", &kws), 0.0);
    }
}
