use crate::error::IndexError;
use crate::{DocId, DocMeta, Posting, TermId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, IndexError>;

/// On-disk layout version written by this crate.
pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
}

pub type Dictionary = (HashMap<String, TermId>, Vec<u32>);

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    fn dictionary(&self) -> PathBuf { self.root.join("dictionary.bin") }
    fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
    fn postings(&self, term_id: TermId) -> PathBuf {
        self.postings_dir().join(format!("{term_id:08}.postings.bin"))
    }
}

fn write_bincode<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut w, value)?;
    w.flush()?;
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let r = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(r)?)
}

pub fn save_dictionary(paths: &IndexPaths, dict: &Dictionary) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bincode(&paths.dictionary(), dict)
}

pub fn load_dictionary(paths: &IndexPaths) -> Result<Dictionary> {
    read_bincode(&paths.dictionary())
}

pub fn save_docs(paths: &IndexPaths, docs: &HashMap<DocId, DocMeta>) -> Result<()> {
    create_dir_all(&paths.root)?;
    write_bincode(&paths.docs(), docs)
}

pub fn load_docs(paths: &IndexPaths) -> Result<HashMap<DocId, DocMeta>> {
    read_bincode(&paths.docs())
}

/// Postings must already be sorted by doc id.
pub fn save_postings_for_term(paths: &IndexPaths, term_id: TermId, postings: &[Posting]) -> Result<()> {
    create_dir_all(paths.postings_dir())?;
    write_bincode(&paths.postings(term_id), postings)
}

pub fn load_postings_for_term(paths: &IndexPaths, term_id: TermId) -> Result<Vec<Posting>> {
    read_bincode(&paths.postings(term_id)).map_err(|e| IndexError::Postings { term_id, source: Box::new(e) })
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let json = serde_json::to_string_pretty(meta)?;
    std::fs::write(paths.meta(), json)?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let json = std::fs::read_to_string(paths.meta())?;
    let meta: MetaFile = serde_json::from_str(&json)?;
    if meta.version != INDEX_VERSION {
        return Err(IndexError::Version { found: meta.version, expected: INDEX_VERSION });
    }
    Ok(meta)
}

/// Load only the header structures required to search: dictionary, df, docs, meta.
pub fn load_index_header(paths: &IndexPaths) -> Result<(HashMap<String, TermId>, Vec<u32>, HashMap<DocId, DocMeta>, MetaFile)> {
    let meta = load_meta(paths)?;
    let (dict, df) = load_dictionary(paths)?;
    let docs = load_docs(paths)?;
    Ok((dict, df, docs, meta))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_version() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let meta = MetaFile { num_docs: 0, created_at: String::new(), version: 99 };
        save_meta(&paths, &meta).unwrap();
        match load_meta(&paths) {
            Err(IndexError::Version { found: 99, expected: INDEX_VERSION }) => {}
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_postings_reports_term() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let err = load_postings_for_term(&paths, 7).unwrap_err();
        assert!(matches!(err, IndexError::Postings { term_id: 7, .. }));
    }
}
