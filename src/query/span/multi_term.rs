//! Span form of a wildcard query.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SarissaError};
use crate::index::{IndexReader, Term};
use crate::query::WildcardQuery;
use crate::query::span::{SpanOrQuery, SpanQuery, SpanTermQuery, Spans};
use crate::query::wildcard::expand_terms;

const SPAN_MULTI_TERM_SEED: u64 = 0x534D_5451;

/// Matches the positions of every term a wildcard pattern expands to.
///
/// Must be rewritten before its spans can be read; rewriting yields a
/// [`SpanOrQuery`] of [`SpanTermQuery`] clauses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanMultiTermQuery {
    wildcard: WildcardQuery,
}

impl SpanMultiTermQuery {
    pub fn new(wildcard: WildcardQuery) -> Self {
        SpanMultiTermQuery { wildcard }
    }

    pub fn wildcard(&self) -> &WildcardQuery {
        &self.wildcard
    }

    pub fn field(&self) -> &str {
        self.wildcard.term().field()
    }

    pub fn boost(&self) -> f32 {
        self.wildcard.boost()
    }

    pub fn set_boost(&mut self, boost: f32) {
        self.wildcard.set_boost(boost);
    }

    pub fn hash_code(&self) -> u64 {
        self.wildcard.hash_code() ^ SPAN_MULTI_TERM_SEED
    }

    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        format!(
            "SpanMultiTermQueryWrapper({})",
            self.wildcard.to_string_with_field(default_field)
        )
    }

    pub fn extract_terms(&self, terms: &mut AHashSet<Term>) -> Result<()> {
        self.wildcard.extract_terms(terms)
    }

    pub fn rewrite(&self, reader: &dyn IndexReader) -> Result<SpanQuery> {
        let boost = self.boost();
        let terms = if self.wildcard.contains_wildcard() {
            expand_terms(reader, self.wildcard.term())?
        } else {
            vec![self.wildcard.term().clone()]
        };

        if let [term] = terms.as_slice() {
            return Ok(SpanTermQuery::from_term(term.clone())
                .with_boost(boost)
                .into());
        }
        let clauses = terms
            .into_iter()
            .map(|term| SpanTermQuery::from_term(term).into())
            .collect();
        Ok(SpanOrQuery::new(clauses)?.with_boost(boost).into())
    }

    pub fn get_spans<'r>(&self, _reader: &'r dyn IndexReader) -> Result<Box<dyn Spans + 'r>> {
        Err(SarissaError::unsupported(format!(
            "{} must be rewritten before reading spans",
            self.to_string_with_field(None)
        )))
    }
}
