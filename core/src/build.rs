use crate::error::IndexError;
use crate::persist::{save_dictionary, save_docs, save_meta, save_postings_for_term, IndexPaths, MetaFile, INDEX_VERSION};
use crate::tokenizer::tokenize;
use crate::{DocId, DocMeta, Posting, TermId};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Accumulates documents in memory and writes a searchable index directory.
#[derive(Default)]
pub struct IndexBuilder {
    dictionary: HashMap<String, TermId>,
    df: Vec<u32>,
    postings_raw: HashMap<TermId, Vec<(DocId, u32)>>,
    docs: HashMap<DocId, DocMeta>,
    names: HashSet<String>,
}

impl IndexBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self) -> usize { self.dictionary.len() }

    /// Tokenize `body` and register the document; ids are assigned in insertion order.
    pub fn add_document(&mut self, name: &str, body: &str) -> Result<DocId, IndexError> {
        if !self.names.insert(name.to_string()) {
            return Err(IndexError::DuplicateDocument(name.to_string()));
        }
        let doc_id = self.docs.len() as DocId;

        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        for term in tokenize(body) {
            let next_id = self.dictionary.len() as TermId;
            let tid = *self.dictionary.entry(term).or_insert(next_id);
            if tid == next_id {
                self.df.push(0);
            }
            *tf_counts.entry(tid).or_insert(0) += 1;
        }
        for (tid, tf_raw) in tf_counts {
            self.df[tid as usize] += 1;
            self.postings_raw.entry(tid).or_default().push((doc_id, tf_raw));
        }

        self.docs.insert(doc_id, DocMeta { name: name.to_string() });
        Ok(doc_id)
    }

    /// Compute normalized tf-idf postings and persist everything under `output`.
    ///
    /// With `smoothed_idf` the idf is `ln(1 + N/df)` instead of `ln(N/df)`.
    pub fn write<P: AsRef<Path>>(self, output: P, smoothed_idf: bool) -> Result<(), IndexError> {
        let paths = IndexPaths::new(output);
        let num_docs = self.docs.len() as u32;
        let n = num_docs.max(1) as f32;

        let mut weighted: HashMap<TermId, Vec<(DocId, f32)>> = HashMap::with_capacity(self.postings_raw.len());
        let mut doc_norms: Vec<f32> = vec![0.0; num_docs as usize];
        for (term_id, plist) in self.postings_raw {
            let df_t = self.df[term_id as usize].max(1) as f32;
            let idf = if smoothed_idf { (1.0 + n / df_t).ln() } else { (n / df_t).ln() };
            let list = plist
                .into_iter()
                .map(|(doc_id, tf_raw)| {
                    let tfidf = (1.0 + (tf_raw as f32).ln()) * idf;
                    doc_norms[doc_id as usize] += tfidf * tfidf;
                    (doc_id, tfidf)
                })
                .collect();
            weighted.insert(term_id, list);
        }
        for dn in doc_norms.iter_mut() {
            *dn = dn.sqrt();
            if *dn == 0.0 { *dn = 1.0; }
        }

        for (term_id, plist) in weighted {
            let mut postings: Vec<Posting> = plist
                .into_iter()
                .map(|(doc_id, tfidf)| Posting { doc_id, weight: tfidf / doc_norms[doc_id as usize] })
                .collect();
            postings.sort_by_key(|p| p.doc_id);
            save_postings_for_term(&paths, term_id, &postings)?;
        }

        let num_terms = self.dictionary.len();
        save_dictionary(&paths, &(self.dictionary, self.df))?;
        save_docs(&paths, &self.docs)?;
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        save_meta(&paths, &MetaFile { num_docs, created_at, version: INDEX_VERSION })?;

        tracing::info!(num_docs, num_terms, root = %paths.root.display(), "index written");
        Ok(())
    }
}
