//! Loads law records from a directory of JSON files and turns them into
//! chunks and indexable documents.
//!
//! A file holds either one record or an array of records; a malformed record
//! is skipped without dropping the rest of its file:
//!
//! ```json
//! { "law_id": "001234", "law_name": "수소법", "law_type": "법률",
//!   "articles": [{ "article_number": "제2조", "title": "정의", "content": "..." }],
//!   "tables":   [{ "table_number": "1", "title": "안전기준", "content": "..." }] }
//! ```
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::chunker::{LawChunker, Paragraph};
use crate::error::{Error, Result};
use crate::types::{Chunk, IndexedDocument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LawRecord {
    pub law_id: String,
    pub law_name: String,
    #[serde(default)]
    pub law_type: Option<String>,
    #[serde(default)]
    pub articles: Vec<ArticleRecord>,
    #[serde(default)]
    pub tables: Vec<TableRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub article_number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub paragraphs: Option<Vec<Paragraph>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub table_number: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Records read from disk. Unreadable files and malformed records inside
/// readable files are counted separately.
#[derive(Debug, Default)]
pub struct Corpus {
    pub records: Vec<LawRecord>,
    pub skipped_files: usize,
    pub skipped_records: usize,
}

#[derive(Default)]
pub struct CorpusLoader {
    chunker: LawChunker,
}

impl CorpusLoader {
    pub fn new(chunker: LawChunker) -> Self { Self { chunker } }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Corpus> {
        if !data_dir.is_dir() {
            return Err(Error::NotFound(format!("corpus directory {}", data_dir.display())));
        }
        let files = list_json_files(data_dir);
        let mut corpus = Corpus::default();
        for (file_index, file_path) in files.iter().enumerate() {
            info!(file = %file_path.display(), "loading law file {}/{}", file_index + 1, files.len());
            let items = match read_items(file_path) {
                Ok(items) => items,
                Err(e) => {
                    warn!(file = %file_path.display(), error = %e, "skipping unreadable law file");
                    corpus.skipped_files += 1;
                    continue;
                }
            };
            for (position, item) in items.into_iter().enumerate() {
                match serde_json::from_value::<LawRecord>(item) {
                    Ok(record) => corpus.records.push(record),
                    Err(e) => {
                        warn!(file = %file_path.display(), position, error = %e, "skipping malformed law record");
                        corpus.skipped_records += 1;
                    }
                }
            }
        }
        info!(
            records = corpus.records.len(),
            skipped_files = corpus.skipped_files,
            skipped_records = corpus.skipped_records,
            "corpus loaded"
        );
        Ok(corpus)
    }

    /// Chunks every article and table, articles first, in record order.
    pub fn chunk_records(&self, records: &[LawRecord]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for record in records {
            chunks.extend(self.chunk_record(record));
        }
        chunks
    }

    pub fn chunk_record(&self, record: &LawRecord) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for article in &record.articles {
            chunks.extend(self.chunker.chunk_article(
                &record.law_id,
                &record.law_name,
                &article.article_number,
                &article.title,
                &article.content,
                article.paragraphs.as_deref(),
            ));
        }
        for table in &record.tables {
            chunks.push(self.chunker.chunk_table(
                &record.law_id,
                &record.law_name,
                &table.table_number,
                &table.title,
                &table.content,
            ));
        }
        chunks
    }

    /// Flattens records into documents; the record's `law_type` label, when
    /// present, travels in each document's metadata.
    pub fn documents(&self, records: &[LawRecord]) -> Vec<IndexedDocument> {
        let mut documents = Vec::new();
        for record in records {
            for chunk in self.chunk_record(record) {
                let mut doc = chunk.to_document();
                if let Some(law_type) = &record.law_type {
                    doc.metadata.insert("law_type".into(), Value::from(law_type.as_str()));
                }
                documents.push(doc);
            }
        }
        documents
    }
}

/// Raw JSON values of a file's records, so one bad record does not take
/// down its neighbours.
fn read_items(file_path: &Path) -> anyhow::Result<Vec<Value>> {
    let bytes = fs::read(file_path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(match serde_json::from_str::<Value>(&text)? {
        Value::Array(items) => items,
        item @ Value::Object(_) => vec![item],
        _ => anyhow::bail!("expected a law record or an array of records"),
    })
}

fn list_json_files(root: &Path) -> Vec<PathBuf> {
    let mut json_files = Vec::new();
    let entries = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());
    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            json_files.push(path.to_path_buf());
        }
    }
    json_files.sort();
    json_files
}
