use clap::error::ErrorKind;
use clap::Parser;
use std::fs;
use std::path::Path;
use surf_core::build::IndexBuilder;
use surf_core::ErrorPolicy;
use surf_trec::{run, Args, RunConfig};
use tempfile::tempdir;

fn build_tiny_index(dir: &Path) {
    let mut b = IndexBuilder::new();
    b.add_document("FT911-1", "rust systems programming language").unwrap();
    b.add_document("FT911-2", "learning rust slowly").unwrap();
    b.add_document("LA0101-3", "pasta sauce recipe").unwrap();
    b.write(dir, false).unwrap();
}

fn config(index: &Path, queries: &Path, output: &Path, k: usize) -> RunConfig {
    RunConfig {
        collection: index.to_path_buf(),
        queries: queries.to_path_buf(),
        k,
        output: Some(output.to_path_buf()),
        index_name: "testidx".into(),
        policy: ErrorPolicy::Abort,
    }
}

#[test]
fn writes_sorted_run_file() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index");
    build_tiny_index(&index);
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "20;pasta recipe\n5;rust programming\n").unwrap();
    let output = dir.path().join("run.trec");

    let summary = run(config(&index, &queries, &output, 2)).unwrap();
    assert_eq!(summary.queries, 2);
    assert_eq!(summary.output, output);

    let text = fs::read_to_string(&output).unwrap();
    let rows: Vec<Vec<&str>> = text.lines().map(|l| l.split('\t').collect()).collect();
    assert_eq!(rows.len(), summary.rows);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][..4], ["5", "Q0", "FT911-1", "0"]);
    assert_eq!(rows[1][..4], ["5", "Q0", "FT911-2", "1"]);
    assert_eq!(rows[2][..4], ["20", "Q0", "LA0101-3", "0"]);
    assert!(rows.iter().all(|r| r[5] == "testidx"));

    // same inputs, same bytes
    let again = dir.path().join("again.trec");
    run(config(&index, &queries, &again, 2)).unwrap();
    assert_eq!(fs::read_to_string(&again).unwrap(), text);
}

#[test]
fn unwritable_output_fails_the_run() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index");
    build_tiny_index(&index);
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "1;rust\n").unwrap();
    let output = dir.path().join("missing-dir").join("run.trec");

    assert!(run(config(&index, &queries, &output, 10)).is_err());
    assert!(!output.exists());
}

#[test]
fn missing_index_fails_before_output() {
    let dir = tempdir().unwrap();
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "1;rust\n").unwrap();
    let output = dir.path().join("run.trec");

    let err = run(config(&dir.path().join("nope"), &queries, &output, 10)).unwrap_err();
    assert!(err.to_string().contains("loading index"));
    assert!(!output.exists());
}

#[test]
fn missing_query_file_argument_is_rejected() {
    let err = Args::try_parse_from(["surf_trec", "-c", "idx"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    let err = Args::try_parse_from(["surf_trec", "-q", "q.txt"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn parses_flags_with_defaults() {
    let cfg = RunConfig::from(Args::try_parse_from(["surf_trec", "-c", "idx", "-q", "q.txt"]).unwrap());
    assert_eq!(cfg.k, 10);
    assert!(cfg.output.is_none());
    assert_eq!(cfg.index_name, surf_trec::DEFAULT_INDEX_NAME);
    assert_eq!(cfg.policy, ErrorPolicy::Abort);

    let cfg = RunConfig::from(
        Args::try_parse_from(["surf_trec", "-c", "idx", "-q", "q.txt", "-k", "100", "-o", "out.trec", "--on-error", "skip"]).unwrap(),
    );
    assert_eq!(cfg.k, 100);
    assert_eq!(cfg.output.as_deref(), Some(Path::new("out.trec")));
    assert_eq!(cfg.policy, ErrorPolicy::Skip);
}

#[test]
fn zero_k_is_rejected() {
    assert!(Args::try_parse_from(["surf_trec", "-c", "idx", "-q", "q.txt", "-k", "0"]).is_err());
}
