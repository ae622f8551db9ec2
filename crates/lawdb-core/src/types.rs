//! Domain types used by the chunker, the lexical index, the vector store and
//! the hybrid engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub type ChunkId = String;
pub type Meta = serde_json::Map<String, Value>;

/// Reads a string-valued metadata entry, defaulting to `""`.
pub fn meta_str<'a>(meta: &'a Meta, key: &str) -> &'a str {
    meta.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Reads a boolean metadata entry, defaulting to `false`.
pub fn meta_flag(meta: &Meta, key: &str) -> bool {
    meta.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkType {
    Article,
    Paragraph,
    TextSplit,
    Table,
    Definition,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Article => "article",
            ChunkType::Paragraph => "paragraph",
            ChunkType::TextSplit => "text_split",
            ChunkType::Table => "table",
            ChunkType::Definition => "definition",
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A retrievable unit of statute text, at most one article long.
///
/// - `chunk_id`: derived from `law_id`, `article_number` and the split key,
///   so re-chunking the same input reproduces the same ids
/// - `paragraph_number`: set only for paragraph chunks that carried a number
/// - `metadata`: chunker flags (`full_article`, `is_definition`, `is_table`,
///   `paragraph_index`, `part_index`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub law_id: String,
    pub law_name: String,
    pub article_number: String,
    pub paragraph_number: Option<String>,
    pub title: String,
    pub content: String,
    pub chunk_type: ChunkType,
    pub metadata: Meta,
}

impl Chunk {
    pub fn is_definition(&self) -> bool {
        meta_flag(&self.metadata, "is_definition")
    }

    /// Flattens the chunk into the `{id, content, metadata}` shape both
    /// indexes operate on. Chunk fields are copied into metadata first and
    /// the chunker flags are layered on top.
    pub fn to_document(&self) -> IndexedDocument {
        let mut metadata = Meta::new();
        metadata.insert("law_id".into(), Value::from(self.law_id.as_str()));
        metadata.insert("law_name".into(), Value::from(self.law_name.as_str()));
        metadata.insert("article_number".into(), Value::from(self.article_number.as_str()));
        metadata.insert(
            "paragraph_number".into(),
            Value::from(self.paragraph_number.as_deref().unwrap_or("")),
        );
        metadata.insert("title".into(), Value::from(self.title.as_str()));
        metadata.insert("chunk_type".into(), Value::from(self.chunk_type.as_str()));
        metadata.insert("chunk_id".into(), Value::from(self.chunk_id.as_str()));
        for (k, v) in &self.metadata {
            metadata.insert(k.clone(), v.clone());
        }
        IndexedDocument { id: self.chunk_id.clone(), content: self.content.clone(), metadata }
    }
}

/// The subset of a chunk the lexical index and the vector store work on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: ChunkId,
    pub content: String,
    #[serde(default)]
    pub metadata: Meta,
}

impl IndexedDocument {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self { id: id.into(), content: content.into(), metadata: Meta::new() }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Which retriever produced a ranked list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Lexical,
}

/// A lexical hit. `score` is BM25 for primary hits and the weighted
/// substring count for fallback hits; higher is always better.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredHit {
    pub id: ChunkId,
    pub content: String,
    pub metadata: Meta,
    pub score: f64,
}

/// A nearest-neighbour hit from the vector collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorHit {
    pub id: ChunkId,
    pub content: String,
    pub metadata: Meta,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity_score: f32,
}

/// A fused candidate. `fusion_score` is always the sum of the two
/// contributions; `final_score` adds the non-negative rerank bonuses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    pub id: ChunkId,
    pub content: String,
    pub metadata: Meta,
    pub vector_contribution: f64,
    pub lexical_contribution: f64,
    pub fusion_score: f64,
    pub final_score: f64,
}

impl ScoredCandidate {
    pub fn new(id: ChunkId, content: String, metadata: Meta) -> Self {
        Self {
            id,
            content,
            metadata,
            vector_contribution: 0.0,
            lexical_contribution: 0.0,
            fusion_score: 0.0,
            final_score: 0.0,
        }
    }
}

/// Kind of legal instrument a chunk belongs to, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LawType {
    /// 법률
    Statute,
    /// 시행령
    Decree,
    /// 시행규칙
    Rule,
    /// 별표
    Table,
}

impl LawType {
    /// Parses the Korean instrument label or its English alias.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "법률" | "statute" => Some(LawType::Statute),
            "시행령" | "decree" => Some(LawType::Decree),
            "시행규칙" | "rule" => Some(LawType::Rule),
            "별표" | "table" => Some(LawType::Table),
            _ => None,
        }
    }

    /// Infers the instrument from a law title such as `"...법 시행령"`.
    pub fn from_law_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.ends_with("시행규칙") {
            Some(LawType::Rule)
        } else if name.ends_with("시행령") {
            Some(LawType::Decree)
        } else if name.ends_with('법') || name.ends_with("법률") {
            Some(LawType::Statute)
        } else {
            None
        }
    }
}
