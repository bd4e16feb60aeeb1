use crate::{QueryId, RankedResult};
use std::collections::BTreeMap;

/// Results of one run keyed by query id, iterated in ascending id order.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: BTreeMap<QueryId, RankedResult>,
}

impl ResultStore {
    pub fn new() -> Self { Self::default() }

    /// Insert a result; a later result for the same id replaces the earlier one.
    pub fn put(&mut self, id: QueryId, result: RankedResult) -> Option<RankedResult> {
        let previous = self.results.insert(id, result);
        if previous.is_some() {
            tracing::warn!(query_id = id, "duplicate query id, keeping the later result");
        }
        previous
    }

    pub fn get(&self, id: QueryId) -> Option<&RankedResult> { self.results.get(&id) }

    pub fn len(&self) -> usize { self.results.len() }

    pub fn is_empty(&self) -> bool { self.results.is_empty() }

    pub fn iter_sorted(&self) -> impl Iterator<Item = (QueryId, &RankedResult)> + '_ {
        self.results.iter().map(|(id, r)| (*id, r))
    }
}
