//! TREC run files: `<qid> Q0 <docname> <rank> <score> <run-tag>`, tab separated.

use crate::error::RunError;
use crate::{Index, ResultStore};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;

/// Write up to `k` rows per query in ascending query id order. Returns the number of rows.
pub fn write_run<I, W>(store: &ResultStore, index: &I, index_name: &str, k: usize, out: &mut W) -> Result<usize, RunError>
where
    I: Index + ?Sized,
    W: Write,
{
    let mut rows = 0;
    for (qid, hits) in store.iter_sorted() {
        for (rank, (doc_id, score)) in hits.iter().take(k).enumerate() {
            let name = index.doc_name(*doc_id).ok_or(RunError::UnknownDocument(*doc_id))?;
            writeln!(out, "{qid}\tQ0\t{name}\t{rank}\t{score}\t{index_name}")?;
            rows += 1;
        }
    }
    Ok(rows)
}

/// Render the whole run in memory, then move it into `path` in one step.
///
/// On failure nothing is left at `path`; an existing file there is untouched.
pub fn write_run_file<I>(path: &Path, store: &ResultStore, index: &I, index_name: &str, k: usize) -> Result<usize, RunError>
where
    I: Index + ?Sized,
{
    let mut buf: Vec<u8> = Vec::new();
    let rows = write_run(store, index, index_name, k, &mut buf)?;

    let output_err = |source| RunError::Output { path: path.to_path_buf(), source };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(output_err)?;
    let mut w = BufWriter::new(tmp);
    w.write_all(&buf).map_err(output_err)?;
    let tmp = w.into_inner().map_err(|e| output_err(e.into_error()))?;
    tmp.as_file().sync_all().map_err(output_err)?;
    tmp.persist(path).map_err(|e| output_err(e.error))?;

    tracing::debug!(rows, path = %path.display(), "run file written");
    Ok(rows)
}

/// `surf-timings-<index>-k<k>-<YYYY-MM-DD-HH:MM:SS>.trec`
pub fn default_run_path(index_name: &str, k: usize, at: OffsetDateTime) -> Result<PathBuf, RunError> {
    let stamp = at.format(format_description!("[year]-[month]-[day]-[hour]:[minute]:[second]"))?;
    Ok(PathBuf::from(format!("surf-timings-{index_name}-k{k}-{stamp}.trec")))
}

/// Local wall-clock time, falling back to UTC when the offset cannot be determined.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IndexError;
    use crate::{DocId, RankedResult};
    use time::macros::datetime;

    struct Names;

    impl Index for Names {
        fn search(&self, _tokens: &[String], _k: usize) -> Result<RankedResult, IndexError> { Ok(Vec::new()) }

        fn doc_name(&self, doc_id: DocId) -> Option<&str> {
            match doc_id {
                3 => Some("FT911-3"),
                7 => Some("FT911-7"),
                9 => Some("LA0101-9"),
                _ => None,
            }
        }
    }

    fn render(store: &ResultStore, k: usize) -> String {
        let mut out: Vec<u8> = Vec::new();
        write_run(store, &Names, "testidx", k, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn writes_trec_rows() {
        let mut store = ResultStore::new();
        store.put(2, vec![(9, 0.5)]);
        store.put(1, vec![(7, 0.91), (3, 0.77)]);
        assert_eq!(
            render(&store, 2),
            "1\tQ0\tFT911-7\t0\t0.91\ttestidx\n\
             1\tQ0\tFT911-3\t1\t0.77\ttestidx\n\
             2\tQ0\tLA0101-9\t0\t0.5\ttestidx\n"
        );
    }

    #[test]
    fn caps_rows_at_k_without_padding() {
        let mut store = ResultStore::new();
        store.put(1, vec![(7, 0.9), (3, 0.8), (9, 0.7)]);
        store.put(4, vec![]);
        let text = render(&store, 2);
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().all(|l| l.starts_with("1\t")));
    }

    #[test]
    fn unknown_document_fails() {
        let mut store = ResultStore::new();
        store.put(1, vec![(100, 0.9)]);
        let err = write_run(&store, &Names, "x", 10, &mut Vec::<u8>::new()).unwrap_err();
        assert!(matches!(err, RunError::UnknownDocument(100)));
    }

    #[test]
    fn default_path_layout() {
        let p = default_run_path("tfidf", 10, datetime!(2024-03-05 07:08:09 UTC)).unwrap();
        assert_eq!(p, PathBuf::from("surf-timings-tfidf-k10-2024-03-05-07:08:09.trec"));
    }

    #[test]
    fn file_write_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.trec");
        std::fs::write(&path, "previous\n").unwrap();

        let mut bad = ResultStore::new();
        bad.put(1, vec![(7, 0.9), (100, 0.1)]);
        assert!(write_run_file(&path, &bad, &Names, "x", 10).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous\n");

        let mut good = ResultStore::new();
        good.put(1, vec![(7, 0.9)]);
        assert_eq!(write_run_file(&path, &good, &Names, "x", 10).unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1\tQ0\tFT911-7\t0\t0.9\tx\n");
    }

    #[test]
    fn missing_directory_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/run.trec");
        let mut store = ResultStore::new();
        store.put(1, vec![(7, 0.9)]);
        assert!(matches!(write_run_file(&path, &store, &Names, "x", 10), Err(RunError::Output { .. })));
    }
}
