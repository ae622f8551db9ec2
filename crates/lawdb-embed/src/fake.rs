use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use lawdb_core::traits::Embedder;

use crate::l2_normalize;

/// Deterministic hashing embedder for tests and offline development.
///
/// Each whitespace token and each 2-character window inside it is hashed
/// into one bucket, so texts sharing Korean compounds (`수소충전소`,
/// `충전소`) land close together.
#[derive(Debug, Clone)]
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            self.bump(&mut v, token, 1.0);
            let chars: Vec<char> = token.chars().collect();
            if chars.len() > 2 {
                for window in chars.windows(2) {
                    let gram: String = window.iter().collect();
                    self.bump(&mut v, &gram, 0.5);
                }
            }
        }
        l2_normalize(&mut v);
        v
    }

    fn bump(&self, v: &mut [f32], key: &str, weight: f32) {
        let mut hasher = XxHash64::with_seed(0);
        key.hash(&mut hasher);
        let h = hasher.finish();
        let idx = (h % self.dim as u64) as usize;
        let val = 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        v[idx] += weight * val;
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        512
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
