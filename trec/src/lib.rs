use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;
use surf_core::query::parse_queries;
use surf_core::trec::{default_run_path, now, write_run_file};
use surf_core::{ErrorPolicy, InvertedIndex, QueryRunner};

pub const DEFAULT_INDEX_NAME: &str = "tfidf";

#[derive(Parser, Debug)]
#[command(name = "surf_trec")]
#[command(about = "Replay a query file against an index, time each query and write a TREC run", long_about = None)]
pub struct Args {
    /// The directory the collection index is stored in
    #[arg(short = 'c', long = "collection")]
    pub collection: PathBuf,
    /// The queries to be performed
    #[arg(short = 'q', long = "queries")]
    pub queries: PathBuf,
    /// The top-k documents to be retrieved for each query
    #[arg(short = 'k', default_value = "10")]
    pub k: NonZeroUsize,
    /// Output run file; defaults to surf-timings-<index>-k<k>-<timestamp>.trec
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Label written in the last column of the run file
    #[arg(short = 'n', long, default_value = DEFAULT_INDEX_NAME)]
    pub index_name: String,
    /// What to do when a query fails inside the index
    #[arg(long, value_enum, default_value_t = OnError::Abort)]
    pub on_error: OnError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    Abort,
    Skip,
}

impl From<OnError> for ErrorPolicy {
    fn from(v: OnError) -> Self {
        match v {
            OnError::Abort => ErrorPolicy::Abort,
            OnError::Skip => ErrorPolicy::Skip,
        }
    }
}

/// Settings for one run, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub collection: PathBuf,
    pub queries: PathBuf,
    pub k: usize,
    pub output: Option<PathBuf>,
    pub index_name: String,
    pub policy: ErrorPolicy,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        Self {
            collection: args.collection,
            queries: args.queries,
            k: args.k.get(),
            output: args.output,
            index_name: args.index_name,
            policy: args.on_error.into(),
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub output: PathBuf,
    pub queries: usize,
    pub skipped: usize,
    pub rows: usize,
}

/// Parse queries, load the index, run every query and write the run file.
pub fn run(cfg: RunConfig) -> Result<RunSummary> {
    tracing::info!("Parsing query file '{}'", cfg.queries.display());
    let queries = parse_queries(&cfg.queries)?;
    tracing::info!("Found {} queries.", queries.len());

    let load_start = Instant::now();
    let index = InvertedIndex::load(&cfg.collection)
        .with_context(|| format!("loading index from '{}'", cfg.collection.display()))?;
    tracing::info!("Index loaded in {} seconds.", load_start.elapsed().as_secs());

    let outcome = QueryRunner::new(&index, cfg.k).on_error(cfg.policy).run(&queries)?;

    let output = match cfg.output {
        Some(p) => p,
        None => default_run_path(&cfg.index_name, cfg.k, now())?,
    };
    tracing::info!("Writing timing results to '{}'", output.display());
    let rows = write_run_file(&output, &outcome.store, &index, &cfg.index_name, cfg.k)?;

    Ok(RunSummary { output, queries: queries.len(), skipped: outcome.skipped.len(), rows })
}
