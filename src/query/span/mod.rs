//! Span queries: queries whose matches carry token positions.
//!
//! A [`Spans`] iterates (document, start, end) triples in document order,
//! then start, then end. Span queries score through [`SpanWeight`], where a
//! document's frequency is the sum of `sloppy_freq(end - start)` over its
//! spans.

pub mod multi_term;
pub mod or;
pub mod scorer;
pub mod term;

use std::fmt::{self, Debug, Display};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{DocId, IndexReader, NO_DOC, NO_MORE_DOCS, Term};

pub use self::multi_term::SpanMultiTermQuery;
pub use self::or::{SpanOrQuery, SpanOrSpans};
pub use self::scorer::{SpanScorer, SpanWeight};
pub use self::term::{SpanTermQuery, TermSpans};

/// A forward-only cursor over the positional matches of a span query.
///
/// Before the first successful `next` or `skip_to` the position is
/// undefined; `doc()` reports [`NO_DOC`].
pub trait Spans: Debug + Display {
    /// Move to the next span, possibly in a later document.
    fn next(&mut self) -> Result<bool>;

    /// Move to the first span in a document at or beyond `target`. Does
    /// nothing if the current document is already at or beyond it.
    fn skip_to(&mut self, target: DocId) -> Result<bool>;

    fn doc(&self) -> DocId;

    /// First position of the current span.
    fn start(&self) -> i32;

    /// One past the last position of the current span.
    fn end(&self) -> i32;
}

/// Spans that never match.
#[derive(Debug, Default)]
pub struct EmptySpans {
    exhausted: bool,
}

impl EmptySpans {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Spans for EmptySpans {
    fn next(&mut self) -> Result<bool> {
        self.exhausted = true;
        Ok(false)
    }

    fn skip_to(&mut self, _target: DocId) -> Result<bool> {
        self.exhausted = true;
        Ok(false)
    }

    fn doc(&self) -> DocId {
        if self.exhausted { NO_MORE_DOCS } else { NO_DOC }
    }

    fn start(&self) -> i32 {
        -1
    }

    fn end(&self) -> i32 {
        -1
    }
}

impl Display for EmptySpans {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("spans(empty)")
    }
}

/// A query producing [`Spans`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "span", rename_all = "snake_case")]
pub enum SpanQuery {
    Term(SpanTermQuery),
    Or(SpanOrQuery),
    MultiTerm(SpanMultiTermQuery),
}

impl SpanQuery {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SpanQuery::Term(_) => "SpanTermQuery",
            SpanQuery::Or(_) => "SpanOrQuery",
            SpanQuery::MultiTerm(_) => "SpanMultiTermQuery",
        }
    }

    /// The field all spans of this query come from; `None` for a
    /// disjunction without clauses.
    pub fn field(&self) -> Option<&str> {
        match self {
            SpanQuery::Term(q) => Some(q.term().field()),
            SpanQuery::Or(q) => q.field(),
            SpanQuery::MultiTerm(q) => Some(q.field()),
        }
    }

    pub fn boost(&self) -> f32 {
        match self {
            SpanQuery::Term(q) => q.boost(),
            SpanQuery::Or(q) => q.boost(),
            SpanQuery::MultiTerm(q) => q.boost(),
        }
    }

    pub fn set_boost(&mut self, boost: f32) {
        match self {
            SpanQuery::Term(q) => q.set_boost(boost),
            SpanQuery::Or(q) => q.set_boost(boost),
            SpanQuery::MultiTerm(q) => q.set_boost(boost),
        }
    }

    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    pub fn hash_code(&self) -> u64 {
        match self {
            SpanQuery::Term(q) => q.hash_code(),
            SpanQuery::Or(q) => q.hash_code(),
            SpanQuery::MultiTerm(q) => q.hash_code(),
        }
    }

    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        match self {
            SpanQuery::Term(q) => q.to_string_with_field(default_field),
            SpanQuery::Or(q) => q.to_string_with_field(default_field),
            SpanQuery::MultiTerm(q) => q.to_string_with_field(default_field),
        }
    }

    pub fn extract_terms(&self, terms: &mut AHashSet<Term>) -> Result<()> {
        match self {
            SpanQuery::Term(q) => {
                terms.insert(q.term().clone());
                Ok(())
            }
            SpanQuery::Or(q) => q.extract_terms(terms),
            SpanQuery::MultiTerm(q) => q.extract_terms(terms),
        }
    }

    /// `None` when nothing changed.
    pub fn rewrite(&self, reader: &dyn IndexReader) -> Result<Option<SpanQuery>> {
        match self {
            SpanQuery::Term(_) => Ok(None),
            SpanQuery::Or(q) => Ok(q.rewrite(reader)?.map(SpanQuery::Or)),
            SpanQuery::MultiTerm(q) => q.rewrite(reader).map(Some),
        }
    }

    /// Positional matches of this query in `reader`.
    pub fn get_spans<'r>(&self, reader: &'r dyn IndexReader) -> Result<Box<dyn Spans + 'r>> {
        match self {
            SpanQuery::Term(q) => Ok(Box::new(q.get_spans(reader)?)),
            SpanQuery::Or(q) => q.get_spans(reader),
            SpanQuery::MultiTerm(q) => q.get_spans(reader),
        }
    }

    /// The largest number of clauses under one disjunction.
    pub fn widest_clause_count(&self) -> usize {
        match self {
            SpanQuery::Or(q) => q
                .clauses()
                .iter()
                .map(SpanQuery::widest_clause_count)
                .fold(q.clauses().len(), usize::max),
            _ => 0,
        }
    }
}

impl Display for SpanQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_field(None))
    }
}

impl From<SpanTermQuery> for SpanQuery {
    fn from(query: SpanTermQuery) -> Self {
        SpanQuery::Term(query)
    }
}

impl From<SpanOrQuery> for SpanQuery {
    fn from(query: SpanOrQuery) -> Self {
        SpanQuery::Or(query)
    }
}

impl From<SpanMultiTermQuery> for SpanQuery {
    fn from(query: SpanMultiTermQuery) -> Self {
        SpanQuery::MultiTerm(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_spans() {
        let mut spans = EmptySpans::new();
        assert_eq!(spans.doc(), NO_DOC);
        assert!(!spans.next().unwrap());
        assert!(!spans.skip_to(3).unwrap());
        assert_eq!(spans.doc(), NO_MORE_DOCS);
        assert_eq!(spans.to_string(), "spans(empty)");
    }

    #[test]
    fn test_serde_tags() {
        let query = SpanQuery::from(SpanTermQuery::new("body", "fox"));
        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains(r#""span":"term""#));
        let back: SpanQuery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, query);
    }
}
