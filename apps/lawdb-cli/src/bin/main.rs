use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lawdb_core::chunker::LawChunker;
use lawdb_core::config::{resolve_with_base, Config, Settings};
use lawdb_core::corpus::CorpusLoader;
use lawdb_core::traits::VectorSearch;
use lawdb_core::types::Meta;
use lawdb_embed::get_default_embedder;
use lawdb_hybrid::HybridSearchEngine;
use lawdb_text::normalize;
use lawdb_vector::MemoryVectorStore;

const USAGE: &str = "Usage: lawdb <chunk|normalize|search|stats> [args...]
  chunk [corpus_dir]                          print chunks as JSON lines
  normalize \"<query>\"                         print the normalized query
  search \"<query>\" [top_k] [key=value ...]    hybrid search over the corpus
  stats [corpus_dir]                          build the index and print statistics";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn corpus_dir(settings: &Settings, arg: Option<&String>) -> anyhow::Result<PathBuf> {
    let raw = arg.map_or(settings.data.corpus_dir.as_str(), String::as_str);
    Ok(resolve_with_base(&env::current_dir()?, raw))
}

/// Embedder initialization failures leave the engine lexical-only.
fn vector_store(settings: &Settings) -> Option<Arc<dyn VectorSearch>> {
    match get_default_embedder(&settings.embedding) {
        Ok(Some(embedder)) => {
            let pb = ProgressBar::new(0);
            let template = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks {msg}";
            if let Ok(style) = ProgressStyle::default_bar().template(template) {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(Arc::new(MemoryVectorStore::new(embedder).with_progress(pb)))
        }
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "embedder unavailable, running lexical-only");
            None
        }
    }
}

fn build_engine(
    settings: &Settings,
    dir: &Path,
    rt: &tokio::runtime::Runtime,
) -> anyhow::Result<HybridSearchEngine> {
    let loader = CorpusLoader::new(LawChunker::new(settings.chunking.clone()));
    let corpus = loader
        .load_directory(dir)
        .with_context(|| format!("loading corpus from {}", dir.display()))?;
    let documents = loader.documents(&corpus.records);
    info!(
        records = corpus.records.len(),
        skipped_files = corpus.skipped_files,
        skipped_records = corpus.skipped_records,
        chunks = documents.len(),
        "documents prepared"
    );

    let engine = HybridSearchEngine::new(&settings.search, vector_store(settings));
    rt.block_on(engine.rebuild(documents))?;
    Ok(engine)
}

fn parse_filters(args: &[String]) -> anyhow::Result<Option<Meta>> {
    let mut filters = Meta::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else { bail!("filter must be key=value, got '{arg}'") };
        let value = match value {
            "true" => serde_json::Value::Bool(true),
            "false" => serde_json::Value::Bool(false),
            other => serde_json::Value::from(other),
        };
        filters.insert(key.to_string(), value);
    }
    Ok((!filters.is_empty()).then_some(filters))
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let settings = config.settings()?;
    let (cmd, args) = parse_args();

    match cmd.as_str() {
        "chunk" => {
            let dir = corpus_dir(&settings, args.first())?;
            let loader = CorpusLoader::new(LawChunker::new(settings.chunking.clone()));
            let corpus = loader.load_directory(&dir)?;
            for chunk in loader.chunk_records(&corpus.records) {
                println!("{}", serde_json::to_string(&chunk)?);
            }
        }
        "normalize" => {
            let Some(query) = args.first() else { bail!("Usage: lawdb normalize \"<query>\"") };
            println!("{}", serde_json::to_string_pretty(&normalize(query))?);
        }
        "search" => {
            let Some(query) = args.first() else { bail!("Usage: lawdb search \"<query>\" [top_k] [key=value ...]") };
            let (top_k, rest) = match args.get(1).map(|s| s.parse::<usize>()) {
                Some(Ok(k)) => (k, &args[2..]),
                _ => (settings.search.default_top_k, &args[1..]),
            };
            let filters = parse_filters(rest)?;
            let dir = corpus_dir(&settings, None)?;
            let rt = tokio::runtime::Runtime::new()?;
            let engine = build_engine(&settings, &dir, &rt)?;
            let response = rt.block_on(engine.search(query, top_k, filters))?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        "stats" => {
            let dir = corpus_dir(&settings, args.first())?;
            let rt = tokio::runtime::Runtime::new()?;
            let engine = build_engine(&settings, &dir, &rt)?;
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
        }
        _ => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
    }
    Ok(())
}
