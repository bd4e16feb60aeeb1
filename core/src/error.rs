use std::path::PathBuf;
use thiserror::Error;

use crate::{DocId, QueryId, TermId};

/// Failures raised by the index while loading or searching.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode index file: {0}")]
    Decode(#[from] bincode::Error),

    #[error("failed to read index metadata: {0}")]
    Meta(#[from] serde_json::Error),

    #[error("unsupported index version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("postings for term {term_id} unavailable: {source}")]
    Postings {
        term_id: TermId,
        #[source]
        source: Box<IndexError>,
    },

    #[error("malformed query: {0}")]
    MalformedQuery(String),

    #[error("duplicate document name '{0}'")]
    DuplicateDocument(String),
}

/// Failures while reading a query file.
#[derive(Error, Debug)]
pub enum QueryFileError {
    #[error("cannot read query file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Failures that abort a run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("query {query_id} failed: {source}")]
    Search {
        query_id: QueryId,
        #[source]
        source: IndexError,
    },

    #[error("document id {0} has no external name")]
    UnknownDocument(DocId),

    #[error("could not write run file '{path}': {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not format run file name: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_error_names_query() {
        let err = RunError::Search { query_id: 42, source: IndexError::MalformedQuery("empty token".into()) };
        let msg = err.to_string();
        assert!(msg.contains("query 42"));
        assert!(msg.contains("empty token"));
    }
}
