//! Client for OpenAI-compatible embedding endpoints.
//!
//! Uses the blocking reqwest client: the vector collaborator is called from
//! `spawn_blocking`, never directly on an async worker.
use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use lawdb_core::config::EmbeddingSettings;
use lawdb_core::traits::Embedder;

use crate::l2_normalize;

pub struct HttpEmbedder {
    client: OnceLock<Client>,
    timeout: Duration,
    url: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
}

impl HttpEmbedder {
    /// Safe to call from async code: the blocking client is only built by the
    /// first `embed_batch`. Once it exists, the embedder must not be dropped
    /// on an async worker thread, since reqwest's blocking client panics there.
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        Ok(Self {
            client: OnceLock::new(),
            timeout: Duration::from_millis(settings.timeout_ms),
            url: format!("{}{}", settings.api_base.trim_end_matches('/'), settings.path),
            model: settings.model.clone(),
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            dim: settings.dimension,
        })
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("building embedding http client")?;
        Ok(self.client.get_or_init(|| client))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Embedder for HttpEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        512
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let body = serde_json::json!({ "model": self.model, "input": texts });
        let mut request = self.client()?.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let json: Value = request
            .send()
            .with_context(|| format!("POST {}", self.url))?
            .error_for_status()?
            .json()
            .context("decoding embedding response")?;

        let mut vectors = parse_embedding_response(&json)?;
        if vectors.len() != texts.len() {
            bail!("embedding endpoint returned {} vectors for {} inputs", vectors.len(), texts.len());
        }
        for v in &mut vectors {
            if v.len() != self.dim {
                bail!("embedding dimension {} does not match configured {}", v.len(), self.dim);
            }
            l2_normalize(v);
        }
        debug!(count = vectors.len(), "embedded batch");
        Ok(vectors)
    }
}

/// Extracts `data[].embedding`, ordered by each item's `index` when present.
pub fn parse_embedding_response(json: &Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("embedding response is missing the data array"))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (position, item) in data.iter().enumerate() {
        let index = item.get("index").and_then(Value::as_u64).map_or(position, |i| i as usize);
        let values = item
            .get("embedding")
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("embedding item {position} has no embedding array"))?;
        let vector = values
            .iter()
            .map(|v| v.as_f64().map(|f| f as f32).ok_or_else(|| anyhow!("embedding values must be numeric")))
            .collect::<Result<Vec<f32>>>()?;
        indexed.push((index, vector));
    }
    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_index() {
        let json = serde_json::json!({
            "data": [
                { "index": 1, "embedding": [2.0, 3.0] },
                { "index": 0, "embedding": [0.5, 1.5] }
            ]
        });
        let parsed = parse_embedding_response(&json).expect("parse");
        assert_eq!(parsed, vec![vec![0.5, 1.5], vec![2.0, 3.0]]);
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(parse_embedding_response(&serde_json::json!({})).is_err());
        assert!(parse_embedding_response(&serde_json::json!({ "data": [{ "index": 0 }] })).is_err());
        assert!(parse_embedding_response(&serde_json::json!({ "data": [{ "embedding": ["x"] }] })).is_err());
    }
}
