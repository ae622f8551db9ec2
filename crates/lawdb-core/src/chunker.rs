//! Splits statute articles and appended tables (별표) into chunks.
//!
//! Short articles stay whole, long articles split by paragraph (항) when the
//! structure is known and by an overlapping character window otherwise.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Chunk, ChunkType, Meta};

/// Title markers of a definitions article (정의 조항).
pub const DEFINITION_KEYWORDS: [&str; 3] = ["정의", "용어", "뜻"];

/// Sizes are counted in characters, not bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chunk_size: 512, overlap: 50 }
    }
}

/// A structured paragraph (항) of an article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub content: String,
}

impl Paragraph {
    pub fn new(number: impl Into<String>, content: impl Into<String>) -> Self {
        Self { number: Some(number.into()), content: content.into() }
    }
}

pub fn is_definition_title(title: &str) -> bool {
    DEFINITION_KEYWORDS.iter().any(|k| title.contains(k))
}

#[derive(Debug, Clone, Default)]
pub struct LawChunker {
    config: ChunkingConfig,
}

impl LawChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        let max_chunk_size = config.max_chunk_size.max(1);
        Self { config: ChunkingConfig { max_chunk_size, overlap: config.overlap } }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunks one article. Always returns at least one chunk.
    ///
    /// Definition detection only applies when the article stays whole;
    /// paragraph and text-split chunks never carry `is_definition`.
    pub fn chunk_article(
        &self,
        law_id: &str,
        law_name: &str,
        article_number: &str,
        title: &str,
        content: &str,
        paragraphs: Option<&[Paragraph]>,
    ) -> Vec<Chunk> {
        let base = ChunkBase { law_id, law_name, article_number, title };

        if content.chars().count() < self.config.max_chunk_size {
            let is_definition = is_definition_title(title);
            let chunk_type = if is_definition { ChunkType::Definition } else { ChunkType::Article };
            let mut metadata = Meta::new();
            metadata.insert("full_article".into(), Value::Bool(true));
            metadata.insert("is_definition".into(), Value::Bool(is_definition));
            return vec![base.chunk(
                format!("{law_id}_{article_number}"),
                None,
                content.to_string(),
                chunk_type,
                metadata,
            )];
        }

        if let Some(paragraphs) = paragraphs.filter(|p| !p.is_empty()) {
            return paragraphs
                .iter()
                .enumerate()
                .map(|(idx, paragraph)| {
                    let key = paragraph.number.clone().unwrap_or_else(|| idx.to_string());
                    let mut metadata = Meta::new();
                    metadata.insert("full_article".into(), Value::Bool(false));
                    metadata.insert("paragraph_index".into(), Value::from(idx));
                    base.chunk(
                        format!("{law_id}_{article_number}_{key}"),
                        paragraph.number.clone(),
                        paragraph.content.clone(),
                        ChunkType::Paragraph,
                        metadata,
                    )
                })
                .collect();
        }

        let mut parts = self.split_long_text(content);
        if parts.is_empty() {
            // Whitespace-only article: keep one empty part so the article stays addressable.
            parts.push(String::new());
        }
        parts
            .into_iter()
            .enumerate()
            .map(|(idx, part)| {
                let mut metadata = Meta::new();
                metadata.insert("full_article".into(), Value::Bool(false));
                metadata.insert("part_index".into(), Value::from(idx));
                base.chunk(
                    format!("{law_id}_{article_number}_part{idx}"),
                    None,
                    part,
                    ChunkType::TextSplit,
                    metadata,
                )
            })
            .collect()
    }

    pub fn chunk_table(
        &self,
        law_id: &str,
        law_name: &str,
        table_number: &str,
        title: &str,
        content: &str,
    ) -> Chunk {
        let mut metadata = Meta::new();
        metadata.insert("is_table".into(), Value::Bool(true));
        Chunk {
            chunk_id: format!("{law_id}_table_{table_number}"),
            law_id: law_id.to_string(),
            law_name: law_name.to_string(),
            article_number: format!("별표{table_number}"),
            paragraph_number: None,
            title: title.to_string(),
            content: content.to_string(),
            chunk_type: ChunkType::Table,
            metadata,
        }
    }

    /// Overlapping window split. A window that stops short of the end is cut
    /// right after its last `.` or newline when that lies past the window start.
    pub fn split_long_text(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let window = self.config.max_chunk_size;
        let mut parts = Vec::new();
        let mut start = 0usize;

        while start < len {
            let mut end = (start + window).min(len);
            if end < len {
                if let Some(offset) = chars[start..end].iter().rposition(|c| *c == '.' || *c == '\n') {
                    if offset > 0 {
                        end = start + offset + 1;
                    }
                }
            }

            let part: String = chars[start..end].iter().collect();
            let part = part.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }

            if end >= len {
                break;
            }
            // An early sentence break can leave less than `overlap` behind; never step backwards.
            let next = end.saturating_sub(self.config.overlap);
            start = if next > start { next } else { end };
        }
        parts
    }
}

struct ChunkBase<'a> {
    law_id: &'a str,
    law_name: &'a str,
    article_number: &'a str,
    title: &'a str,
}

impl ChunkBase<'_> {
    fn chunk(
        &self,
        chunk_id: String,
        paragraph_number: Option<String>,
        content: String,
        chunk_type: ChunkType,
        metadata: Meta,
    ) -> Chunk {
        Chunk {
            chunk_id,
            law_id: self.law_id.to_string(),
            law_name: self.law_name.to_string(),
            article_number: self.article_number.to_string(),
            paragraph_number,
            title: self.title.to_string(),
            content,
            chunk_type,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(max: usize, overlap: usize) -> LawChunker {
        LawChunker::new(ChunkingConfig { max_chunk_size: max, overlap })
    }

    #[test]
    fn split_applies_overlap() {
        let parts = chunker(100, 20).split_long_text(&"가".repeat(250));
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].chars().count(), 100);
        // windows start at 0, 80 and 160
        assert_eq!(parts[2].chars().count(), 90);
    }

    #[test]
    fn split_prefers_sentence_boundary() {
        let text = format!("{}.{}", "가".repeat(30), "나".repeat(40));
        let parts = chunker(50, 5).split_long_text(&text);
        assert_eq!(parts[0], format!("{}.", "가".repeat(30)));
        assert!(parts[1].starts_with("가가가가."), "second window overlaps the first: {}", parts[1]);
    }

    #[test]
    fn split_ignores_boundary_at_window_start() {
        let text = format!(".{}", "가".repeat(80));
        let parts = chunker(50, 10).split_long_text(&text);
        assert_eq!(parts[0].chars().count(), 50);
    }

    #[test]
    fn split_terminates_when_break_is_inside_overlap() {
        let text = format!("가.{}", "나".repeat(300));
        let parts = chunker(100, 50).split_long_text(&text);
        assert!(!parts.is_empty());
        assert_eq!(parts[0], "가.");
    }
}
