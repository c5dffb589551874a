//! Wildcard query implementation for pattern matching.
//!
//! `*` matches any run of characters and `?` exactly one; a backslash makes
//! the next character literal.

use ahash::AHashSet;
use bit_vec::BitVec;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SarissaError};
use crate::index::{IndexReader, Term, TermDocs, TermEnum};
use crate::query::{
    BooleanQuery, Query, TermQuery, boost_bits, boost_suffix, check_boost, default_boost,
    term_to_string,
};
use crate::search::Filter;

const WILDCARD_QUERY_SEED: u64 = 0x5749_4C44;

/// A query that matches terms using wildcard patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WildcardQuerySpec", into = "WildcardQuerySpec")]
pub struct WildcardQuery {
    term: Term,
    boost: f32,
    /// Whether the term text holds `*` or `?`.
    contains_wildcard: bool,
}

/// Serialized form; the wildcard flag is recomputed on load.
#[derive(Serialize, Deserialize)]
struct WildcardQuerySpec {
    term: Term,
    #[serde(default = "default_boost")]
    boost: f32,
}

impl From<WildcardQuerySpec> for WildcardQuery {
    fn from(spec: WildcardQuerySpec) -> Self {
        WildcardQuery::from_term(spec.term).with_boost(spec.boost)
    }
}

impl From<WildcardQuery> for WildcardQuerySpec {
    fn from(query: WildcardQuery) -> Self {
        WildcardQuerySpec {
            term: query.term,
            boost: query.boost,
        }
    }
}

impl WildcardQuery {
    /// Create a new wildcard query.
    pub fn new<F, T>(field: F, pattern: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Self::from_term(Term::new(field, pattern))
    }

    pub fn from_term(term: Term) -> Self {
        let contains_wildcard = term.text().contains(['*', '?']);
        WildcardQuery {
            term,
            boost: 1.0,
            contains_wildcard,
        }
    }

    /// The pattern term.
    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn pattern(&self) -> &str {
        self.term.text()
    }

    pub fn contains_wildcard(&self) -> bool {
        self.contains_wildcard
    }

    pub fn boost(&self) -> f32 {
        self.boost
    }

    pub fn set_boost(&mut self, boost: f32) {
        check_boost(boost);
        self.boost = boost;
    }

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    pub fn hash_code(&self) -> u64 {
        boost_bits(self.boost) ^ self.term.hash_code() ^ WILDCARD_QUERY_SEED
    }

    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        format!(
            "{}{}",
            term_to_string(&self.term, default_field),
            boost_suffix(self.boost)
        )
    }

    /// A literal pattern contributes its term; a real pattern must be
    /// rewritten first.
    pub fn extract_terms(&self, terms: &mut AHashSet<Term>) -> Result<()> {
        if self.contains_wildcard {
            return Err(SarissaError::unsupported(format!(
                "cannot extract terms from unrewritten wildcard query {}",
                self.to_string_with_field(None)
            )));
        }
        terms.insert(self.term.clone());
        Ok(())
    }

    /// A literal pattern becomes a [`TermQuery`]. A real pattern becomes a
    /// coord-disabled disjunction of the matching terms: no clauses when
    /// nothing matches, the bare term query when exactly one term does.
    pub fn rewrite(&self, reader: &dyn IndexReader) -> Result<Query> {
        if !self.contains_wildcard {
            return Ok(TermQuery::from_term(self.term.clone())
                .with_boost(self.boost)
                .into());
        }

        let terms = expand_terms(reader, &self.term)?;
        debug!(
            "wildcard {} expanded to {} terms",
            self.to_string_with_field(None),
            terms.len()
        );

        if let [term] = terms.as_slice() {
            return Ok(TermQuery::from_term(term.clone())
                .with_boost(self.boost)
                .into());
        }
        let mut query = BooleanQuery::with_coord_disabled();
        for term in terms {
            query.add(TermQuery::from_term(term).with_boost(self.boost).into());
        }
        Ok(query.into())
    }
}

/// Every index term matching `pattern`, in term order.
pub(crate) fn expand_terms(reader: &dyn IndexReader, pattern: &Term) -> Result<Vec<Term>> {
    let mut terms = WildcardTermEnum::new(reader, pattern)?;
    let collected = drain_terms(&mut terms);
    let closed = terms.close();
    let collected = collected?;
    closed?;
    Ok(collected)
}

fn drain_terms(terms: &mut dyn TermEnum) -> Result<Vec<Term>> {
    let mut collected = Vec::new();
    while let Some(term) = terms.term() {
        collected.push(term.clone());
        if !terms.next()? {
            break;
        }
    }
    Ok(collected)
}

/// Compile a wildcard pattern into an anchored regular expression.
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex> {
    let mut regex_pattern = String::from("^");
    let mut chars = pattern.chars();
    let mut literal = [0u8; 4];
    while let Some(c) = chars.next() {
        match c {
            '*' => regex_pattern.push_str(".*"),
            '?' => regex_pattern.push('.'),
            '\\' => {
                let escaped = chars.next().unwrap_or('\\');
                regex_pattern.push_str(&regex::escape(escaped.encode_utf8(&mut literal)));
            }
            c => regex_pattern.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }
    regex_pattern.push('$');

    Regex::new(&regex_pattern)
        .map_err(|e| SarissaError::query(format!("invalid wildcard pattern {pattern:?}: {e}")))
}

/// The literal text before the first unescaped wildcard.
fn literal_prefix(pattern: &str) -> String {
    let mut prefix = String::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' | '?' => break,
            '\\' => prefix.push(chars.next().unwrap_or('\\')),
            c => prefix.push(c),
        }
    }
    prefix
}

/// Enumerates the index terms of one field that match a wildcard pattern.
///
/// Enumeration starts at the pattern's literal prefix and stops at the
/// first term outside the field or the prefix.
#[derive(Debug)]
pub struct WildcardTermEnum<'r> {
    terms: Box<dyn TermEnum + 'r>,
    field: String,
    prefix: String,
    regex: Regex,
    current: Option<Term>,
    doc_freq: i32,
}

impl<'r> WildcardTermEnum<'r> {
    /// Positioned on the first matching term, if any.
    pub fn new(reader: &'r dyn IndexReader, pattern: &Term) -> Result<Self> {
        let regex = compile_pattern(pattern.text())?;
        let prefix = literal_prefix(pattern.text());
        let terms = reader.terms_from(&pattern.with_text(prefix.clone()))?;
        let mut this = WildcardTermEnum {
            terms,
            field: pattern.field().to_string(),
            prefix,
            regex,
            current: None,
            doc_freq: 0,
        };
        if let Err(e) = this.settle() {
            this.terms.close()?;
            return Err(e);
        }
        Ok(this)
    }

    /// Every match is exact.
    pub fn difference(&self) -> f32 {
        1.0
    }

    /// Move the underlying enumeration to the next matching term.
    fn settle(&mut self) -> Result<()> {
        while let Some(term) = self.terms.term() {
            if term.field() != self.field || !term.text().starts_with(&self.prefix) {
                break;
            }
            if self.regex.is_match(term.text()) {
                self.current = Some(term.clone());
                self.doc_freq = self.terms.doc_freq();
                return Ok(());
            }
            if !self.terms.next()? {
                break;
            }
        }
        self.current = None;
        self.doc_freq = 0;
        Ok(())
    }
}

impl TermEnum for WildcardTermEnum<'_> {
    fn term(&self) -> Option<&Term> {
        self.current.as_ref()
    }

    fn doc_freq(&self) -> i32 {
        self.doc_freq
    }

    fn next(&mut self) -> Result<bool> {
        if self.current.is_none() {
            return Ok(false);
        }
        if !self.terms.next()? {
            self.current = None;
            return Ok(false);
        }
        self.settle()?;
        Ok(self.current.is_some())
    }

    fn close(&mut self) -> Result<()> {
        self.current = None;
        self.terms.close()
    }
}

/// Permits the documents containing any term that matches a pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct WildcardFilter {
    term: Term,
}

impl WildcardFilter {
    pub fn new(term: Term) -> Self {
        WildcardFilter { term }
    }

    pub fn term(&self) -> &Term {
        &self.term
    }
}

impl std::fmt::Display for WildcardFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.term.field().is_empty() {
            f.write_str(self.term.text())
        } else {
            write!(f, "{}", self.term)
        }
    }
}

impl Filter for WildcardFilter {
    fn bits(&self, reader: &dyn IndexReader) -> Result<BitVec> {
        let mut bits = BitVec::from_elem(reader.max_doc().max(0) as usize, false);
        let mut terms = WildcardTermEnum::new(reader, &self.term)?;
        if terms.term().is_none() {
            terms.close()?;
            return Ok(bits);
        }

        let mut term_docs = match reader.term_docs() {
            Ok(term_docs) => term_docs,
            Err(e) => {
                terms.close()?;
                return Err(e);
            }
        };
        let filled = fill_bits(&mut bits, &mut terms, term_docs.as_mut());
        let docs_closed = term_docs.close();
        let terms_closed = terms.close();
        filled?;
        docs_closed?;
        terms_closed?;
        Ok(bits)
    }
}

fn fill_bits(bits: &mut BitVec, terms: &mut dyn TermEnum, term_docs: &mut dyn TermDocs) -> Result<()> {
    while let Some(term) = terms.term() {
        term_docs.seek(term)?;
        while term_docs.next()? {
            bits.set(term_docs.doc() as usize, true);
        }
        if !terms.next()? {
            break;
        }
    }
    Ok(())
}
