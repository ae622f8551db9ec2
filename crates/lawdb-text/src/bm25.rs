//! Okapi BM25 over pre-tokenized documents.
//!
//! IDF follows the classic Okapi form `ln((N - df + 0.5) / (df + 0.5))`.
//! Terms that occur in more than half of the corpus would get a negative IDF;
//! those are floored to `EPSILON * average_idf` instead. A term present in
//! exactly half of the corpus scores zero.
use std::collections::HashMap;

pub const K1: f64 = 1.5;
pub const B: f64 = 0.75;
pub const EPSILON: f64 = 0.25;

#[derive(Debug, Clone, Copy)]
struct Posting {
    doc: u32,
    term_frequency: u32,
}

#[derive(Debug, Default)]
pub struct Bm25Index {
    postings: HashMap<String, Vec<Posting>>,
    idf: HashMap<String, f64>,
    doc_lengths: Vec<u32>,
    avgdl: f64,
}

impl Bm25Index {
    /// Indexes `corpus`; document `i` keeps position `i` in score vectors.
    pub fn build(corpus: &[Vec<String>]) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(corpus.len());
        let mut total_len = 0u64;

        for (doc, tokens) in corpus.iter().enumerate() {
            doc_lengths.push(tokens.len() as u32);
            total_len += tokens.len() as u64;

            let mut tf_map: HashMap<&str, u32> = HashMap::new();
            for token in tokens {
                *tf_map.entry(token.as_str()).or_insert(0) += 1;
            }
            for (term, tf) in tf_map {
                postings.entry(term.to_string()).or_default().push(Posting { doc: doc as u32, term_frequency: tf });
            }
        }

        let n = corpus.len() as f64;
        let mut idf = HashMap::with_capacity(postings.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        // Sorted so the average (and thus the floor) is identical across rebuilds.
        let mut terms: Vec<&String> = postings.keys().collect();
        terms.sort();
        for term in terms {
            let df = postings[term].len() as f64;
            let value = (n - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }
        let average_idf = if idf.is_empty() { 0.0 } else { idf_sum / idf.len() as f64 };
        for term in negative {
            idf.insert(term, EPSILON * average_idf);
        }

        let avgdl = if corpus.is_empty() { 0.0 } else { total_len as f64 / n };
        Self { postings, idf, doc_lengths, avgdl }
    }

    pub fn len(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lengths.is_empty()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.idf.get(term).copied()
    }

    /// Scores every document; repeated query tokens count once per occurrence.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f64> {
        let mut scores = vec![0.0; self.doc_lengths.len()];
        if self.avgdl <= 0.0 {
            return scores;
        }
        for token in query_tokens {
            let (Some(list), Some(idf)) = (self.postings.get(token), self.idf.get(token)) else { continue };
            for posting in list {
                let dl = f64::from(self.doc_lengths[posting.doc as usize]);
                let tf = f64::from(posting.term_frequency);
                let tf_norm = (tf * (K1 + 1.0)) / (tf + K1 * (1.0 - B + B * dl / self.avgdl));
                scores[posting.doc as usize] += idf * tf_norm;
            }
        }
        scores
    }
}
