//! The per-search form of a query.

use std::fmt::Debug;

use crate::error::Result;
use crate::index::{DocId, IndexReader};
use crate::query::Query;
use crate::search::explanation::Explanation;
use crate::search::scorer::Scorer;

/// Scoring state of a query bound to one searcher.
///
/// A weight is built by [`Searcher::create_weight`](crate::search::Searcher::create_weight),
/// which runs the normalization protocol: `sum_of_squared_weights`, then
/// `normalize` with the searcher's query norm. Only afterwards are `value`
/// and the scorers it builds meaningful.
pub trait Weight: Debug {
    /// The query this weight was created from.
    fn query(&self) -> &Query;

    /// The normalized weight.
    fn value(&self) -> f32;

    /// Squared weight, summed over sub-queries.
    fn sum_of_squared_weights(&mut self) -> Result<f32>;

    /// Apply the query norm.
    fn normalize(&mut self, query_norm: f32);

    /// Build a scorer over `reader`.
    fn scorer<'r>(&self, reader: &'r dyn IndexReader) -> Result<Box<dyn Scorer + 'r>>;

    /// Explain the score of `doc`.
    fn explain(&self, reader: &dyn IndexReader, doc: DocId) -> Result<Explanation>;
}
