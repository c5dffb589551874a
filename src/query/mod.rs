//! Query types and their rewriting, weighting and rendering.
//!
//! Queries form a closed set: [`Query`] has one variant per kind and span
//! queries nest under [`Query::Span`]. Every query carries a boost (default
//! 1.0), compares structurally, hashes consistently with equality and
//! renders in the classic query syntax.
//!
//! # Rewriting
//!
//! Multi-term queries cannot be scored directly. [`Query::rewrite`] expands
//! them against a reader into primitive queries, returning
//! [`Cow::Borrowed`] when nothing changed. Each call performs a full
//! rewrite; [`Searcher::rewrite`](crate::search::Searcher::rewrite) repeats
//! it until the query is stable.

pub mod boolean;
pub mod match_all;
pub mod span;
pub mod term;
pub mod wildcard;

use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{IndexReader, Term};
use crate::search::{Searcher, Weight};

pub use self::boolean::{BooleanQuery, BooleanWeight, DisjunctionSumScorer};
pub use self::match_all::{MatchAllDocsQuery, MatchAllDocsWeight, MatchAllScorer};
pub use self::span::{
    EmptySpans, SpanMultiTermQuery, SpanOrQuery, SpanQuery, SpanScorer, SpanTermQuery,
    SpanWeight, Spans, TermSpans,
};
pub use self::term::{TermQuery, TermScorer, TermWeight};
pub use self::wildcard::{WildcardFilter, WildcardQuery, WildcardTermEnum};

/// A search query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Query {
    Term(TermQuery),
    Boolean(BooleanQuery),
    MatchAllDocs(MatchAllDocsQuery),
    Wildcard(WildcardQuery),
    Span(SpanQuery),
}

// Boosts are never NaN, so equality is reflexive.
impl Eq for Query {}

impl Hash for Query {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl Query {
    /// Kind name used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Query::Term(_) => "TermQuery",
            Query::Boolean(_) => "BooleanQuery",
            Query::MatchAllDocs(_) => "MatchAllDocsQuery",
            Query::Wildcard(_) => "WildcardQuery",
            Query::Span(q) => q.kind_name(),
        }
    }

    pub fn boost(&self) -> f32 {
        match self {
            Query::Term(q) => q.boost(),
            Query::Boolean(q) => q.boost(),
            Query::MatchAllDocs(q) => q.boost(),
            Query::Wildcard(q) => q.boost(),
            Query::Span(q) => q.boost(),
        }
    }

    /// Set the boost.
    ///
    /// # Panics
    ///
    /// Panics if `boost` is NaN.
    pub fn set_boost(&mut self, boost: f32) {
        match self {
            Query::Term(q) => q.set_boost(boost),
            Query::Boolean(q) => q.set_boost(boost),
            Query::MatchAllDocs(q) => q.set_boost(boost),
            Query::Wildcard(q) => q.set_boost(boost),
            Query::Span(q) => q.set_boost(boost),
        }
    }

    /// This query with a different boost.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    /// Hash consistent with equality and stable across processes.
    pub fn hash_code(&self) -> u64 {
        match self {
            Query::Term(q) => q.hash_code(),
            Query::Boolean(q) => q.hash_code(),
            Query::MatchAllDocs(q) => q.hash_code(),
            Query::Wildcard(q) => q.hash_code(),
            Query::Span(q) => q.hash_code(),
        }
    }

    /// Render in query syntax, omitting the field name where it equals
    /// `default_field`.
    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        match self {
            Query::Term(q) => q.to_string_with_field(default_field),
            Query::Boolean(q) => q.to_string_with_field(default_field),
            Query::MatchAllDocs(q) => q.to_string_with_field(default_field),
            Query::Wildcard(q) => q.to_string_with_field(default_field),
            Query::Span(q) => q.to_string_with_field(default_field),
        }
    }

    /// Add the terms this query matches on to `terms`.
    ///
    /// Only valid on rewritten queries: a wildcard query that still holds
    /// wildcards fails with [`SarissaError::Unsupported`](crate::error::SarissaError::Unsupported).
    pub fn extract_terms(&self, terms: &mut AHashSet<Term>) -> Result<()> {
        match self {
            Query::Term(q) => {
                terms.insert(q.term().clone());
                Ok(())
            }
            Query::Boolean(q) => q.extract_terms(terms),
            Query::MatchAllDocs(_) => Ok(()),
            Query::Wildcard(q) => q.extract_terms(terms),
            Query::Span(q) => q.extract_terms(terms),
        }
    }

    /// Rewrite into primitive queries.
    pub fn rewrite(&self, reader: &dyn IndexReader) -> Result<Cow<'_, Query>> {
        let rewritten = match self {
            Query::Term(_) | Query::MatchAllDocs(_) => None,
            Query::Boolean(q) => q.rewrite(reader)?,
            Query::Wildcard(q) => Some(q.rewrite(reader)?),
            Query::Span(q) => q.rewrite(reader)?.map(Query::Span),
        };
        Ok(match rewritten {
            Some(query) => Cow::Owned(query),
            None => Cow::Borrowed(self),
        })
    }

    /// Build the weight of this query for `searcher`. The query must already
    /// be rewritten; [`Searcher::create_weight`] rewrites and normalizes.
    pub fn create_weight(&self, searcher: &Searcher<'_>) -> Result<Box<dyn Weight>> {
        match self {
            Query::Term(q) => Ok(Box::new(TermWeight::new(q, searcher)?)),
            Query::Boolean(q) => Ok(Box::new(BooleanWeight::new(q, searcher)?)),
            Query::MatchAllDocs(q) => Ok(Box::new(MatchAllDocsWeight::new(q))),
            Query::Wildcard(q) => Err(crate::error::SarissaError::unsupported(format!(
                "{} must be rewritten before it can be weighted",
                q.to_string_with_field(None)
            ))),
            Query::Span(q) => Ok(Box::new(SpanWeight::new(q, searcher)?)),
        }
    }

    /// The largest number of direct clauses held by any node of this query.
    pub fn widest_clause_count(&self) -> usize {
        match self {
            Query::Boolean(q) => q
                .clauses()
                .iter()
                .map(Query::widest_clause_count)
                .fold(q.clauses().len(), usize::max),
            Query::Span(q) => q.widest_clause_count(),
            _ => 0,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_field(None))
    }
}

impl From<TermQuery> for Query {
    fn from(query: TermQuery) -> Self {
        Query::Term(query)
    }
}

impl From<BooleanQuery> for Query {
    fn from(query: BooleanQuery) -> Self {
        Query::Boolean(query)
    }
}

impl From<MatchAllDocsQuery> for Query {
    fn from(query: MatchAllDocsQuery) -> Self {
        Query::MatchAllDocs(query)
    }
}

impl From<WildcardQuery> for Query {
    fn from(query: WildcardQuery) -> Self {
        Query::Wildcard(query)
    }
}

impl From<SpanQuery> for Query {
    fn from(query: SpanQuery) -> Self {
        Query::Span(query)
    }
}

impl From<SpanTermQuery> for Query {
    fn from(query: SpanTermQuery) -> Self {
        Query::Span(query.into())
    }
}

impl From<SpanOrQuery> for Query {
    fn from(query: SpanOrQuery) -> Self {
        Query::Span(query.into())
    }
}

impl From<SpanMultiTermQuery> for Query {
    fn from(query: SpanMultiTermQuery) -> Self {
        Query::Span(query.into())
    }
}

pub(crate) fn default_boost() -> f32 {
    1.0
}

pub(crate) fn check_boost(boost: f32) {
    assert!(!boost.is_nan(), "boost must not be NaN");
}

/// `^boost` when the boost differs from 1, else nothing.
pub(crate) fn boost_suffix(boost: f32) -> String {
    if boost != 1.0 {
        format!("^{boost:?}")
    } else {
        String::new()
    }
}

/// Bits of a boost for hashing; `-0.0` hashes like `0.0` since they compare equal.
pub(crate) fn boost_bits(boost: f32) -> u64 {
    if boost == 0.0 {
        0
    } else {
        u64::from(boost.to_bits())
    }
}

/// `text` alone when the term is in `default_field`, else `field:text`.
pub(crate) fn term_to_string(term: &Term, default_field: Option<&str>) -> String {
    if default_field == Some(term.field()) {
        term.text().to_string()
    } else {
        term.to_string()
    }
}
