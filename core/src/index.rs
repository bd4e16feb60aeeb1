use crate::error::IndexError;
use crate::persist::{load_index_header, load_postings_for_term, IndexPaths};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

pub type TermId = u32;
pub type DocId = u32;

/// Ranked `(doc_id, score)` pairs, best first.
pub type RankedResult = Vec<(DocId, f32)>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    /// External document name written to run files.
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f32, // normalized tf-idf weight
}

/// A loaded, read-only retrieval structure.
///
/// Calls are independent of each other: implementations must not carry state
/// from one search into the next.
pub trait Index {
    /// Rank documents for `tokens`, returning at most `k` hits ordered by descending score.
    fn search(&self, tokens: &[String], k: usize) -> Result<RankedResult, IndexError>;

    /// Resolve an internal document id to its external name.
    fn doc_name(&self, doc_id: DocId) -> Option<&str>;
}

/// TF-IDF inverted index whose postings stay on disk and are read per query term.
pub struct InvertedIndex {
    paths: IndexPaths,
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    docs: HashMap<DocId, DocMeta>,
    num_docs: u32,
}

impl InvertedIndex {
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self, IndexError> {
        let paths = IndexPaths::new(root);
        let (dictionary, df, docs, meta) = load_index_header(&paths)?;
        tracing::debug!(num_docs = meta.num_docs, num_terms = dictionary.len(), created_at = %meta.created_at, "loaded index header");
        Ok(Self { paths, dictionary, df, docs, num_docs: meta.num_docs })
    }

    pub fn num_docs(&self) -> u32 { self.num_docs }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    /// Normalized log-tf * idf weights for the known terms of a query.
    fn query_weights(&self, tokens: &[String]) -> Result<HashMap<TermId, f32>, IndexError> {
        let mut tf_q_raw: HashMap<TermId, u32> = HashMap::new();
        for term in tokens {
            if term.is_empty() {
                return Err(IndexError::MalformedQuery("empty token".into()));
            }
            if let Some(&tid) = self.dictionary.get(term) {
                *tf_q_raw.entry(tid).or_insert(0) += 1;
            }
        }

        let n = self.num_docs.max(1);
        let mut q_weights: HashMap<TermId, f32> = HashMap::with_capacity(tf_q_raw.len());
        for (tid, tf_raw) in tf_q_raw {
            let tf = 1.0 + (tf_raw as f32).ln();
            let df_t = self.df.get(tid as usize).copied().unwrap_or(1).max(1);
            let idf = ((n as f32) / (df_t as f32)).ln();
            q_weights.insert(tid, tf * idf);
        }
        let mut norm = q_weights.values().map(|w| w * w).sum::<f32>().sqrt();
        if norm == 0.0 { norm = 1.0; }
        for w in q_weights.values_mut() { *w /= norm; }
        Ok(q_weights)
    }
}

impl Index for InvertedIndex {
    fn search(&self, tokens: &[String], k: usize) -> Result<RankedResult, IndexError> {
        let q_weights = self.query_weights(tokens)?;
        if q_weights.is_empty() {
            return Ok(Vec::new());
        }

        let mut scores: HashMap<DocId, f32> = HashMap::new();
        for (tid, q_w) in &q_weights {
            for p in load_postings_for_term(&self.paths, *tid)? {
                // cosine since doc weights are normalized
                *scores.entry(p.doc_id).or_insert(0.0) += p.weight * q_w;
            }
        }

        let mut scored: RankedResult = scores.into_iter().collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal).then(a.0.cmp(&b.0)));
        scored.truncate(k);
        Ok(scored)
    }

    fn doc_name(&self, doc_id: DocId) -> Option<&str> {
        self.docs.get(&doc_id).map(|d| d.name.as_str())
    }
}
