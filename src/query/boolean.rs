//! Boolean query of optional clauses.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::binary_heap::PeekMut;
use std::sync::Arc;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{DocId, IndexReader, NO_DOC, NO_MORE_DOCS, Term};
use crate::query::{Query, boost_bits, boost_suffix, check_boost, default_boost};
use crate::search::explanation::Explanation;
use crate::search::scorer::{EmptyScorer, Scorer, assert_positioned, effective_target};
use crate::search::similarity::Similarity;
use crate::search::{Searcher, Weight};

const BOOLEAN_QUERY_SEED: u64 = 0xB001_EA17;

/// A disjunction: matches documents matching any clause, scoring the sum of
/// the clause scores scaled by the fraction of clauses that matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanQuery {
    #[serde(default)]
    clauses: Vec<Query>,
    #[serde(default = "default_boost")]
    boost: f32,
    /// Skip the coordination factor; set on expansions of a single term
    /// pattern, where matching more variants is no evidence of relevance.
    #[serde(default)]
    disable_coord: bool,
}

impl Default for BooleanQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl BooleanQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        BooleanQuery {
            clauses: Vec::new(),
            boost: 1.0,
            disable_coord: false,
        }
    }

    /// Create an empty query that does not apply the coordination factor.
    pub fn with_coord_disabled() -> Self {
        BooleanQuery {
            disable_coord: true,
            ..Self::new()
        }
    }

    /// Add an optional clause.
    pub fn add(&mut self, clause: Query) {
        self.clauses.push(clause);
    }

    /// Builder form of [`add`](Self::add).
    pub fn with_clause(mut self, clause: Query) -> Self {
        self.add(clause);
        self
    }

    pub fn clauses(&self) -> &[Query] {
        &self.clauses
    }

    pub fn is_coord_disabled(&self) -> bool {
        self.disable_coord
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn set_boost(&mut self, boost: f32) {
        check_boost(boost);
        self.boost = boost;
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    pub fn hash_code(&self) -> u64 {
        let clauses = self
            .clauses
            .iter()
            .fold(1u64, |h, clause| h.wrapping_mul(31).wrapping_add(clause.hash_code()));
        clauses ^ boost_bits(self.boost) ^ BOOLEAN_QUERY_SEED ^ u64::from(self.disable_coord)
    }

    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        let mut buffer = String::new();
        let boosted = self.boost != 1.0;
        if boosted {
            buffer.push('(');
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                buffer.push(' ');
            }
            let rendered = clause.to_string_with_field(default_field);
            if matches!(clause, Query::Boolean(_)) {
                buffer.push('(');
                buffer.push_str(&rendered);
                buffer.push(')');
            } else {
                buffer.push_str(&rendered);
            }
        }
        if boosted {
            buffer.push(')');
            buffer.push_str(&boost_suffix(self.boost));
        }
        buffer
    }

    pub fn extract_terms(&self, terms: &mut AHashSet<Term>) -> Result<()> {
        for clause in &self.clauses {
            clause.extract_terms(terms)?;
        }
        Ok(())
    }

    /// A single clause collapses to that clause, boosted by this query's
    /// boost. Otherwise clauses are rewritten and the query is copied only
    /// if one of them changed.
    pub fn rewrite(&self, reader: &dyn IndexReader) -> Result<Option<Query>> {
        if let [clause] = self.clauses.as_slice() {
            let mut query = clause.rewrite(reader)?.into_owned();
            if self.boost != 1.0 {
                query.set_boost(query.boost() * self.boost);
            }
            return Ok(Some(query));
        }

        let mut copy: Option<BooleanQuery> = None;
        for (i, clause) in self.clauses.iter().enumerate() {
            let rewritten = match clause.rewrite(reader)? {
                Cow::Owned(query) => query,
                Cow::Borrowed(_) => continue,
            };
            copy.get_or_insert_with(|| self.clone()).clauses[i] = rewritten;
        }
        Ok(copy.map(Query::Boolean))
    }
}

/// Weight of a [`BooleanQuery`]: one sub-weight per clause.
#[derive(Debug)]
pub struct BooleanWeight {
    query: Query,
    boost: f32,
    value: f32,
    disable_coord: bool,
    similarity: Arc<dyn Similarity>,
    weights: Vec<Box<dyn Weight>>,
}

impl BooleanWeight {
    pub fn new(query: &BooleanQuery, searcher: &Searcher<'_>) -> Result<Self> {
        let weights = query
            .clauses()
            .iter()
            .map(|clause| clause.create_weight(searcher))
            .collect::<Result<Vec<_>>>()?;
        Ok(BooleanWeight {
            query: Query::Boolean(query.clone()),
            boost: query.boost(),
            value: query.boost(),
            disable_coord: query.is_coord_disabled(),
            similarity: Arc::clone(searcher.similarity()),
            weights,
        })
    }

    fn coord(&self, overlap: usize) -> f32 {
        if self.disable_coord {
            1.0
        } else {
            self.similarity.coord(overlap, self.weights.len())
        }
    }
}

impl Weight for BooleanWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value(&self) -> f32 {
        self.value
    }

    fn sum_of_squared_weights(&mut self) -> Result<f32> {
        let mut sum = 0.0;
        for weight in &mut self.weights {
            sum += weight.sum_of_squared_weights()?;
        }
        Ok(sum * self.boost * self.boost)
    }

    fn normalize(&mut self, query_norm: f32) {
        let norm = query_norm * self.boost;
        self.value = norm;
        for weight in &mut self.weights {
            weight.normalize(norm);
        }
    }

    fn scorer<'r>(&self, reader: &'r dyn IndexReader) -> Result<Box<dyn Scorer + 'r>> {
        if self.weights.is_empty() {
            return Ok(Box::new(EmptyScorer::new()));
        }
        let scorers = self
            .weights
            .iter()
            .map(|weight| weight.scorer(reader))
            .collect::<Result<Vec<_>>>()?;
        let coord = (0..=scorers.len()).map(|overlap| self.coord(overlap)).collect();
        Ok(Box::new(DisjunctionSumScorer::new(scorers, coord)))
    }

    fn explain(&self, reader: &dyn IndexReader, doc: DocId) -> Result<Explanation> {
        let mut sum_explanation = Explanation::new(0.0, "sum of:");
        let mut sum = 0.0;
        let mut overlap = 0;
        for weight in &self.weights {
            let explanation = weight.explain(reader, doc)?;
            if explanation.is_match() {
                sum += explanation.value();
                overlap += 1;
                sum_explanation.add_detail(explanation);
            }
        }
        if overlap == 0 {
            return Ok(Explanation::no_match("no matching clause"));
        }
        sum_explanation.set_value(sum);

        let coord = self.coord(overlap);
        if coord == 1.0 {
            return Ok(sum_explanation);
        }
        Ok(Explanation::new(sum * coord, "product of:")
            .with_detail(sum_explanation)
            .with_detail(Explanation::new(
                coord,
                format!("coord({overlap}/{})", self.weights.len()),
            )))
    }
}

/// A sub-scorer ordered by its current document.
#[derive(Debug)]
struct ScorerEntry<'r> {
    scorer: Box<dyn Scorer + 'r>,
}

impl PartialEq for ScorerEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.scorer.doc() == other.scorer.doc()
    }
}

impl Eq for ScorerEntry<'_> {}

impl PartialOrd for ScorerEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScorerEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower documents come first
        other.scorer.doc().cmp(&self.scorer.doc())
    }
}

/// Union of sub-scorers, summing the scores of those on the same document.
#[derive(Debug)]
pub struct DisjunctionSumScorer<'r> {
    /// Sub-scorers not yet advanced; moved into the heap on first use.
    pending: Option<Vec<Box<dyn Scorer + 'r>>>,
    /// Min-heap of positioned sub-scorers, ordered by current document.
    heap: BinaryHeap<ScorerEntry<'r>>,
    /// Coordination factor indexed by the number of matching sub-scorers.
    coord: Vec<f32>,
    doc: DocId,
    score: f32,
    matchers: usize,
}

impl<'r> DisjunctionSumScorer<'r> {
    /// `coord[n]` scales the score of a document matched by `n` sub-scorers.
    pub fn new(scorers: Vec<Box<dyn Scorer + 'r>>, coord: Vec<f32>) -> Self {
        DisjunctionSumScorer {
            pending: Some(scorers),
            heap: BinaryHeap::new(),
            coord,
            doc: NO_DOC,
            score: 0.0,
            matchers: 0,
        }
    }

    /// Number of sub-scorers matching the current document.
    pub fn matchers(&self) -> usize {
        self.matchers
    }

    fn init(&mut self, target: Option<DocId>) -> Result<()> {
        for mut scorer in self.pending.take().unwrap_or_default() {
            let positioned = match target {
                Some(target) => scorer.skip_to(target)?,
                None => scorer.next()?,
            };
            if positioned {
                self.heap.push(ScorerEntry { scorer });
            }
        }
        Ok(())
    }

    /// Gather every sub-scorer on the smallest document and advance them.
    fn advance_to_next_doc(&mut self) -> Result<bool> {
        let Some(top) = self.heap.peek() else {
            self.doc = NO_MORE_DOCS;
            self.score = 0.0;
            self.matchers = 0;
            return Ok(false);
        };
        let doc = top.scorer.doc();

        let mut sum = 0.0;
        let mut matchers = 0;
        while let Some(mut entry) = self.heap.peek_mut() {
            if entry.scorer.doc() != doc {
                break;
            }
            sum += entry.scorer.score();
            matchers += 1;
            if !entry.scorer.next()? {
                PeekMut::pop(entry);
            }
        }

        self.doc = doc;
        self.matchers = matchers;
        self.score = sum * self.coord.get(matchers).copied().unwrap_or(1.0);
        Ok(true)
    }
}

impl Scorer for DisjunctionSumScorer<'_> {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        if self.pending.is_some() {
            self.init(None)?;
        }
        self.advance_to_next_doc()
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        let target = effective_target(self.doc, target);
        if self.pending.is_some() {
            self.init(Some(target))?;
        } else {
            while let Some(mut entry) = self.heap.peek_mut() {
                if entry.scorer.doc() >= target {
                    break;
                }
                if !entry.scorer.skip_to(target)? {
                    PeekMut::pop(entry);
                }
            }
        }
        self.advance_to_next_doc()
    }

    fn score(&self) -> f32 {
        assert_positioned(self.doc, "DisjunctionSumScorer");
        self.score
    }
}
