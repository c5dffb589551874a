//! Term query implementation for exact term matching.

use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{DocId, IndexReader, NO_DOC, NO_MORE_DOCS, Term, TermDocs};
use crate::query::{Query, boost_bits, boost_suffix, check_boost, default_boost, term_to_string};
use crate::search::explanation::Explanation;
use crate::search::scorer::{Scorer, assert_positioned, effective_target};
use crate::search::similarity::Similarity;
use crate::search::{Searcher, Weight};

const TERM_QUERY_SEED: u64 = 0x5445_524D;

/// A query that matches documents containing a specific term.
///
/// The term is matched exactly; it is not analyzed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    term: Term,
    #[serde(default = "default_boost")]
    boost: f32,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new<F, T>(field: F, text: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Self::from_term(Term::new(field, text))
    }

    pub fn from_term(term: Term) -> Self {
        TermQuery { term, boost: 1.0 }
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

    /// Set the boost factor.
    pub fn with_boost(mut self, boost: f32) -> Self {
        self.set_boost(boost);
        self
    }

    pub fn hash_code(&self) -> u64 {
        boost_bits(self.boost) ^ self.term.hash_code() ^ TERM_QUERY_SEED
    }

    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        format!(
            "{}{}",
            term_to_string(&self.term, default_field),
            boost_suffix(self.boost)
        )
    }
}

/// Weight of a [`TermQuery`]: `idf * boost`, normalized, times `idf`.
#[derive(Debug)]
pub struct TermWeight {
    query: Query,
    term: Term,
    boost: f32,
    similarity: Arc<dyn Similarity>,
    doc_freq: i32,
    num_docs: i32,
    idf: f32,
    query_weight: f32,
    query_norm: f32,
    value: f32,
}

impl TermWeight {
    pub fn new(query: &TermQuery, searcher: &Searcher<'_>) -> Result<Self> {
        let similarity = Arc::clone(searcher.similarity());
        let doc_freq = searcher.doc_freq(query.term())?;
        let num_docs = searcher.reader().num_docs();
        let idf = similarity.idf(doc_freq, num_docs);
        Ok(TermWeight {
            query: Query::Term(query.clone()),
            term: query.term().clone(),
            boost: query.boost(),
            similarity,
            doc_freq,
            num_docs,
            idf,
            query_weight: 0.0,
            query_norm: 1.0,
            value: 0.0,
        })
    }

    pub fn idf(&self) -> f32 {
        self.idf
    }

    fn idf_explanation(&self) -> Explanation {
        Explanation::new(
            self.idf,
            format!("idf(docFreq={}, numDocs={})", self.doc_freq, self.num_docs),
        )
    }

    fn query_explanation(&self) -> Explanation {
        let mut explanation = Explanation::new(
            self.query_weight,
            format!("queryWeight({}), product of:", self.query),
        );
        if self.boost != 1.0 {
            explanation.add_detail(Explanation::new(self.boost, "boost"));
        }
        explanation.add_detail(self.idf_explanation());
        explanation.add_detail(Explanation::new(self.query_norm, "queryNorm"));
        explanation
    }
}

impl Weight for TermWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value(&self) -> f32 {
        self.value
    }

    fn sum_of_squared_weights(&mut self) -> Result<f32> {
        self.query_weight = self.idf * self.boost;
        Ok(self.query_weight * self.query_weight)
    }

    fn normalize(&mut self, query_norm: f32) {
        self.query_norm = query_norm;
        self.query_weight *= query_norm;
        self.value = self.query_weight * self.idf;
    }

    fn scorer<'r>(&self, reader: &'r dyn IndexReader) -> Result<Box<dyn Scorer + 'r>> {
        let term_docs = reader.term_docs_for(&self.term)?;
        Ok(Box::new(TermScorer::new(
            term_docs,
            reader,
            self.term.field(),
            self.value,
            Arc::clone(&self.similarity),
        )))
    }

    fn explain(&self, reader: &dyn IndexReader, doc: DocId) -> Result<Explanation> {
        let mut term_docs = reader.term_docs_for(&self.term)?;
        let found = term_docs.skip_to(doc);
        let freq = match found {
            Ok(true) if term_docs.doc() == doc => term_docs.freq(),
            Ok(_) => 0,
            Err(e) => {
                term_docs.close()?;
                return Err(e);
            }
        };
        term_docs.close()?;

        if freq == 0 {
            return Ok(Explanation::no_match(format!(
                "no match on required term ({})",
                self.term
            )));
        }

        let tf = self.similarity.tf(freq as f32);
        let norm = reader.norm(self.term.field(), doc);
        let field_explanation = Explanation::new(
            tf * self.idf * norm,
            format!("fieldWeight({} in {doc}), product of:", self.term),
        )
        .with_detail(Explanation::new(tf, format!("tf(termFreq({})={freq})", self.term)))
        .with_detail(self.idf_explanation())
        .with_detail(Explanation::new(
            norm,
            format!("fieldNorm(field={}, doc={doc})", self.term.field()),
        ));

        let query_explanation = self.query_explanation();
        if query_explanation.value() == 1.0 {
            return Ok(field_explanation);
        }
        Ok(Explanation::new(
            query_explanation.value() * field_explanation.value(),
            format!("weight({} in {doc}), product of:", self.query),
        )
        .with_detail(query_explanation)
        .with_detail(field_explanation))
    }
}

/// Scores the documents of one term: `tf(freq) * weight * norm`.
#[derive(Debug)]
pub struct TermScorer<'r> {
    term_docs: Box<dyn TermDocs + 'r>,
    reader: &'r dyn IndexReader,
    field: String,
    weight_value: f32,
    similarity: Arc<dyn Similarity>,
    doc: DocId,
    freq: i32,
}

impl<'r> TermScorer<'r> {
    pub fn new(
        term_docs: Box<dyn TermDocs + 'r>,
        reader: &'r dyn IndexReader,
        field: &str,
        weight_value: f32,
        similarity: Arc<dyn Similarity>,
    ) -> Self {
        TermScorer {
            term_docs,
            reader,
            field: field.to_string(),
            weight_value,
            similarity,
            doc: NO_DOC,
            freq: 0,
        }
    }

    /// Frequency of the term in the current document.
    pub fn freq(&self) -> i32 {
        self.freq
    }

    fn settle(&mut self, found: bool) -> bool {
        if found {
            self.doc = self.term_docs.doc();
            self.freq = self.term_docs.freq();
        } else {
            self.doc = NO_MORE_DOCS;
            self.freq = 0;
        }
        found
    }
}

impl Scorer for TermScorer<'_> {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        let found = self.term_docs.next()?;
        Ok(self.settle(found))
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        let target = effective_target(self.doc, target);
        let found = self.term_docs.skip_to(target)?;
        Ok(self.settle(found))
    }

    fn score(&self) -> f32 {
        assert_positioned(self.doc, "TermScorer");
        self.similarity.tf(self.freq as f32)
            * self.weight_value
            * self.reader.norm(&self.field, self.doc)
    }
}

impl Drop for TermScorer<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.term_docs.close() {
            warn!("failed to close term docs of field {}: {e}", self.field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.add_document([("body", "apple banana")]);
        index.add_document([("body", "cherry")]);
        index.add_document([("body", "apple apple cherry")]);
        index
    }

    #[test]
    fn test_render_and_equality() {
        let query = TermQuery::new("body", "apple").with_boost(2.0);
        assert_eq!(query.to_string_with_field(None), "body:apple^2.0");
        assert_eq!(query.to_string_with_field(Some("body")), "apple^2.0");
        assert_eq!(query, query.clone());
        assert_ne!(query, TermQuery::new("body", "apple"));
        assert_eq!(query.hash_code(), query.clone().hash_code());
    }

    #[test]
    fn test_scorer_iterates_matching_docs() {
        let index = index();
        let searcher = Searcher::new(&index);
        let mut scorer = searcher
            .scorer(&Query::from(TermQuery::new("body", "apple")))
            .unwrap();

        assert_eq!(scorer.doc(), NO_DOC);
        assert!(scorer.next().unwrap());
        assert_eq!(scorer.doc(), 0);
        let single = scorer.score();
        assert!(scorer.next().unwrap());
        assert_eq!(scorer.doc(), 2);
        assert!(scorer.score() > 0.0);
        assert!(single > 0.0);
        assert!(!scorer.next().unwrap());
        assert!(!scorer.next().unwrap());
        assert_eq!(scorer.doc(), NO_MORE_DOCS);
    }

    #[test]
    fn test_skip_to_never_moves_backwards() {
        let index = index();
        let searcher = Searcher::new(&index);
        let mut scorer = searcher
            .scorer(&Query::from(TermQuery::new("body", "cherry")))
            .unwrap();
        assert!(scorer.skip_to(2).unwrap());
        assert_eq!(scorer.doc(), 2);
        assert!(!scorer.skip_to(1).unwrap());
    }

    #[test]
    fn test_scorer_releases_cursor() {
        let index = index();
        {
            let searcher = Searcher::new(&index);
            let _scorer = searcher
                .scorer(&Query::from(TermQuery::new("body", "apple")))
                .unwrap();
            assert_eq!(index.open_cursors(), 1);
        }
        assert_eq!(index.open_cursors(), 0);
    }

    #[test]
    fn test_explain_matches_score() {
        let index = index();
        let searcher = Searcher::new(&index);
        let query = Query::from(TermQuery::new("body", "apple"));
        let mut scorer = searcher.scorer(&query).unwrap();
        assert!(scorer.skip_to(2).unwrap());

        let explanation = searcher.explain(&query, 2).unwrap();
        assert!((explanation.value() - scorer.score()).abs() < 1e-5);
        assert!(!searcher.explain(&query, 1).unwrap().is_match());
    }
}
