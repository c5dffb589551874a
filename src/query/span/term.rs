//! Spans of a single term.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{DocId, IndexReader, NO_DOC, NO_MORE_DOCS, Term, TermPositions};
use crate::query::span::Spans;
use crate::query::{boost_bits, boost_suffix, check_boost, default_boost, term_to_string};

const SPAN_TERM_SEED: u64 = 0x5350_5445;

/// Matches the positions of one term; each span covers one position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanTermQuery {
    term: Term,
    #[serde(default = "default_boost")]
    boost: f32,
}

impl SpanTermQuery {
    pub fn new<F, T>(field: F, text: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Self::from_term(Term::new(field, text))
    }

    pub fn from_term(term: Term) -> Self {
        SpanTermQuery { term, boost: 1.0 }
    }

    pub fn term(&self) -> &Term {
        &self.term
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
        boost_bits(self.boost) ^ self.term.hash_code() ^ SPAN_TERM_SEED
    }

    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        format!(
            "{}{}",
            term_to_string(&self.term, default_field),
            boost_suffix(self.boost)
        )
    }

    pub fn get_spans<'r>(&self, reader: &'r dyn IndexReader) -> Result<TermSpans<'r>> {
        let positions = reader.term_positions_for(&self.term)?;
        Ok(TermSpans::new(positions, self.term.clone()))
    }
}

/// Walks the positions of a term, document by document.
#[derive(Debug)]
pub struct TermSpans<'r> {
    positions: Box<dyn TermPositions + 'r>,
    term: Term,
    doc: DocId,
    /// Occurrences in the current document.
    freq: i32,
    /// Occurrences of the current document already read.
    count: i32,
    position: i32,
}

impl<'r> TermSpans<'r> {
    pub fn new(positions: Box<dyn TermPositions + 'r>, term: Term) -> Self {
        TermSpans {
            positions,
            term,
            doc: NO_DOC,
            freq: 0,
            count: 0,
            position: -1,
        }
    }

    fn enter_document(&mut self) -> Result<bool> {
        self.doc = self.positions.doc();
        self.freq = self.positions.freq();
        self.count = 0;
        self.read_position()
    }

    fn read_position(&mut self) -> Result<bool> {
        self.position = self.positions.next_position()?;
        self.count += 1;
        Ok(true)
    }

    fn exhaust(&mut self) -> bool {
        self.doc = NO_MORE_DOCS;
        self.position = -1;
        false
    }
}

impl Spans for TermSpans<'_> {
    fn next(&mut self) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        if self.count < self.freq {
            return self.read_position();
        }
        if !self.positions.next()? {
            return Ok(self.exhaust());
        }
        self.enter_document()
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        if self.doc >= target {
            return Ok(true);
        }
        if !self.positions.skip_to(target)? {
            return Ok(self.exhaust());
        }
        self.enter_document()
    }

    fn doc(&self) -> DocId {
        self.doc
    }

    fn start(&self) -> i32 {
        self.position
    }

    fn end(&self) -> i32 {
        self.position + 1
    }
}

impl fmt::Display for TermSpans<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spans({})@", self.term)?;
        match self.doc {
            NO_DOC => f.write_str("START"),
            NO_MORE_DOCS => f.write_str("END"),
            doc => write!(f, "{doc}-{}", self.position),
        }
    }
}

impl Drop for TermSpans<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.positions.close() {
            warn!("failed to close positions of {}: {e}", self.term);
        }
    }
}
