//! Query files: one `<id>;<text>` query per line.

use crate::error::QueryFileError;
use crate::tokenizer::tokenize;
use std::io::BufRead;
use std::path::Path;

pub type QueryId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub id: QueryId,
    pub tokens: Vec<String>,
}

/// Parse a query file, keeping file order. Duplicate ids are kept as-is.
pub fn parse_queries<P: AsRef<Path>>(path: P) -> Result<Vec<Query>, QueryFileError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|source| QueryFileError::Io { path: path.to_path_buf(), source })?;
    read_queries(std::io::BufReader::new(file)).map_err(|e| match e {
        QueryFileError::Io { source, .. } => QueryFileError::Io { path: path.to_path_buf(), source },
        other => other,
    })
}

pub fn read_queries<R: BufRead>(reader: R) -> Result<Vec<Query>, QueryFileError> {
    let mut queries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| QueryFileError::Io { path: Default::default(), source })?;
        if let Some(q) = parse_line(&line, idx + 1)? {
            queries.push(q);
        }
    }
    Ok(queries)
}

fn parse_line(line: &str, line_no: usize) -> Result<Option<Query>, QueryFileError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (id, text) = line
        .split_once(';')
        .ok_or_else(|| QueryFileError::Parse { line: line_no, reason: "expected '<id>;<query text>'".into() })?;
    let id = id.trim();
    let invalid = || QueryFileError::Parse { line: line_no, reason: format!("invalid query id '{id}'") };
    // ids are written back verbatim, so only plain digits are accepted
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let id: QueryId = id.parse().map_err(|_| invalid())?;
    Ok(Some(Query { id, tokens: tokenize(text) }))
}
