use crate::error::{IndexError, RunError};
use crate::{Index, Query, QueryId, ResultStore};
use std::time::{Duration, Instant};

/// What to do when a single query fails inside the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the run at the first failing query.
    #[default]
    Abort,
    /// Log the failure, leave the query out of the results and keep going.
    Skip,
}

/// Elapsed time of one search call.
#[derive(Debug, Clone, Copy)]
pub struct TimingSample {
    pub query_id: QueryId,
    pub num_tokens: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Default)]
pub struct RunOutcome {
    pub store: ResultStore,
    pub timings: Vec<TimingSample>,
    pub skipped: Vec<(QueryId, IndexError)>,
}

impl RunOutcome {
    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|t| t.elapsed).sum()
    }

    pub fn mean_time(&self) -> Option<Duration> {
        let n = u32::try_from(self.timings.len()).ok().filter(|n| *n > 0)?;
        Some(self.total_time() / n)
    }
}

/// Replays queries against an index one at a time, timing each search.
pub struct QueryRunner<'a, I: Index + ?Sized> {
    index: &'a I,
    k: usize,
    policy: ErrorPolicy,
}

impl<'a, I: Index + ?Sized> QueryRunner<'a, I> {
    pub fn new(index: &'a I, k: usize) -> Self {
        Self { index, k, policy: ErrorPolicy::default() }
    }

    pub fn on_error(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn run(&self, queries: &[Query]) -> Result<RunOutcome, RunError> {
        let mut outcome = RunOutcome { timings: Vec::with_capacity(queries.len()), ..Default::default() };

        for query in queries {
            let start = Instant::now();
            let result = self.index.search(&query.tokens, self.k);
            let elapsed = start.elapsed();

            tracing::info!("[{}] |Q|={} TIME = {} ms", query.id, query.tokens.len(), format_ms(elapsed));
            outcome.timings.push(TimingSample { query_id: query.id, num_tokens: query.tokens.len(), elapsed });

            match result {
                Ok(mut hits) => {
                    hits.truncate(self.k);
                    outcome.store.put(query.id, hits);
                }
                Err(source) if self.policy == ErrorPolicy::Skip => {
                    tracing::warn!(query_id = query.id, error = %source, "query failed, skipping");
                    outcome.skipped.push((query.id, source));
                }
                Err(source) => return Err(RunError::Search { query_id: query.id, source }),
            }
        }

        let mean = outcome.mean_time().unwrap_or_default();
        tracing::info!(
            queries = outcome.timings.len(),
            skipped = outcome.skipped.len(),
            total_ms = %format_ms(outcome.total_time()),
            mean_ms = %format_ms(mean),
            "query processing finished"
        );
        Ok(outcome)
    }
}

/// Milliseconds rounded to three significant digits.
pub fn format_ms(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms == 0.0 {
        return "0".to_string();
    }
    let mut magnitude = ms.log10().floor() as i32;
    let mut digits = (ms * 10f64.powi(2 - magnitude)).round();
    // rounding 9.996 up to 10.0 moves into the next decade
    if digits >= 1000.0 {
        magnitude += 1;
        digits = (digits / 10.0).round();
    }
    if magnitude >= 2 {
        format!("{:.0}", digits * 10f64.powi(magnitude - 2))
    } else {
        format!("{:.*}", (2 - magnitude) as usize, digits / 10f64.powi(2 - magnitude))
    }
}
