//! Query normalization for Korean statute search.
//!
//! Korean attaches particles and verb endings to the word they modify
//! (`충전소에서`, `설치하는`), so whitespace tokens are paired with a stem
//! that drops one trailing particle/ending. The same tokenizer runs over
//! documents at index time.
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Particles (조사) and endings (어미) stripped from the end of a token.
pub const PARTICLE_SUFFIXES: [&str; 30] = [
    "은", "는", "이", "가", "을", "를", "에", "의", "로", "와", "과", "도", "만", "부터", "까지", "에서", "으로",
    "하여", "하고", "하는", "하면", "한다", "된다", "이다", "한", "된", "할", "함", "등", "및",
];

/// Standalone particles dropped from the echoed query keywords.
pub const STOPWORDS: [&str; 10] = ["은", "는", "이", "가", "을", "를", "의", "에", "와", "과"];

/// Short domain words and the regulatory term they stand for.
pub const LEGAL_TERMS: [(&str, &str); 6] = [
    ("설치", "설치기준"),
    ("운영", "운영기준"),
    ("검사", "안전검사"),
    ("인증", "인증기준"),
    ("충전소", "수소충전소"),
    ("저장소", "수소저장소"),
];

static SUFFIXES_LONGEST_FIRST: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut suffixes = PARTICLE_SUFFIXES.to_vec();
    suffixes.sort_by_key(|s| std::cmp::Reverse(s.chars().count()));
    suffixes
});

// 제N조, optionally followed by 제M항 and 제K호.
static ARTICLE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"제\d+조(?:제\d+항)?(?:제\d+호)?").expect("article reference pattern is valid"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Query {
    pub raw: String,
    /// Whitespace tokens minus standalone particles; echoed and highlighted.
    pub keywords: Vec<String>,
    /// Surface tokens interleaved with their stems, in order of appearance.
    pub normalized_tokens: Vec<String>,
    pub legal_term_expansions: Vec<String>,
    pub article_references: Vec<String>,
}

pub fn normalize(raw: &str) -> Query {
    Query {
        raw: raw.to_string(),
        keywords: keywords(raw),
        normalized_tokens: tokenize(raw),
        legal_term_expansions: legal_terms(raw),
        article_references: article_references(raw),
    }
}

/// Strips the longest particle/ending from the end of `token`. Returns `None`
/// when nothing matches or when the token is only a particle.
pub fn stem(token: &str) -> Option<&str> {
    SUFFIXES_LONGEST_FIRST
        .iter()
        .find(|suffix| token.ends_with(*suffix))
        .map(|suffix| &token[..token.len() - suffix.len()])
        .filter(|stem| !stem.is_empty())
}

pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for token in text.split_whitespace() {
        tokens.push(token.to_string());
        if let Some(stem) = stem(token) {
            tokens.push(stem.to_string());
        }
    }
    tokens
}

pub fn keywords(text: &str) -> Vec<String> {
    text.split_whitespace().filter(|t| !STOPWORDS.contains(t)).map(str::to_string).collect()
}

pub fn legal_terms(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for (key, term) in LEGAL_TERMS {
        if text.contains(key) && !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

pub fn article_references(text: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for m in ARTICLE_REF.find_iter(text) {
        if !refs.iter().any(|r| r == m.as_str()) {
            refs.push(m.as_str().to_string());
        }
    }
    refs
}
