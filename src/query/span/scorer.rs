//! Weighting and scoring of span queries.

use std::sync::Arc;

use ahash::AHashSet;

use crate::error::Result;
use crate::index::{DocId, IndexReader, NO_DOC, NO_MORE_DOCS, Term};
use crate::query::Query;
use crate::query::span::{SpanQuery, Spans};
use crate::search::explanation::Explanation;
use crate::search::scorer::{Scorer, assert_positioned, effective_target};
use crate::search::similarity::Similarity;
use crate::search::{Searcher, Weight};

/// Weight of a span query; its idf is the sum of its terms' idfs.
#[derive(Debug)]
pub struct SpanWeight {
    query: Query,
    span_query: SpanQuery,
    similarity: Arc<dyn Similarity>,
    terms: Vec<Term>,
    idf: f32,
    query_weight: f32,
    query_norm: f32,
    value: f32,
}

impl SpanWeight {
    pub fn new(query: &SpanQuery, searcher: &Searcher<'_>) -> Result<Self> {
        let similarity = Arc::clone(searcher.similarity());
        let mut term_set = AHashSet::new();
        query.extract_terms(&mut term_set)?;
        let mut terms: Vec<Term> = term_set.into_iter().collect();
        terms.sort();

        let num_docs = searcher.reader().num_docs();
        let mut idf = 0.0;
        for term in &terms {
            idf += similarity.idf(searcher.doc_freq(term)?, num_docs);
        }

        Ok(SpanWeight {
            query: Query::Span(query.clone()),
            span_query: query.clone(),
            similarity,
            terms,
            idf,
            query_weight: 0.0,
            query_norm: 1.0,
            value: 0.0,
        })
    }

    /// The distinct terms the query matches on, in term order.
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn span_scorer<'r>(&self, reader: &'r dyn IndexReader) -> Result<SpanScorer<'r>> {
        Ok(SpanScorer::new(
            self.span_query.get_spans(reader)?,
            reader,
            self.span_query.field(),
            self.value,
            Arc::clone(&self.similarity),
        ))
    }

    fn idf_explanation(&self) -> Explanation {
        let terms: Vec<String> = self.terms.iter().map(Term::to_string).collect();
        Explanation::new(self.idf, format!("idf({})", terms.join(" ")))
    }
}

impl Weight for SpanWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value(&self) -> f32 {
        self.value
    }

    fn sum_of_squared_weights(&mut self) -> Result<f32> {
        self.query_weight = self.idf * self.span_query.boost();
        Ok(self.query_weight * self.query_weight)
    }

    fn normalize(&mut self, query_norm: f32) {
        self.query_norm = query_norm;
        self.query_weight *= query_norm;
        self.value = self.query_weight * self.idf;
    }

    fn scorer<'r>(&self, reader: &'r dyn IndexReader) -> Result<Box<dyn Scorer + 'r>> {
        Ok(Box::new(self.span_scorer(reader)?))
    }

    fn explain(&self, reader: &dyn IndexReader, doc: DocId) -> Result<Explanation> {
        let mut scorer = self.span_scorer(reader)?;
        if !scorer.skip_to(doc)? || scorer.doc() != doc {
            return Ok(Explanation::no_match(format!(
                "no spans of {} in {doc}",
                self.span_query
            )));
        }

        let boost = self.span_query.boost();
        let mut query_explanation = Explanation::new(
            self.query_weight,
            format!("queryWeight({}), product of:", self.query),
        );
        if boost != 1.0 {
            query_explanation.add_detail(Explanation::new(boost, "boost"));
        }
        query_explanation.add_detail(self.idf_explanation());
        query_explanation.add_detail(Explanation::new(self.query_norm, "queryNorm"));

        let freq = scorer.freq();
        let tf = self.similarity.tf(freq);
        let norm = scorer.field_norm();
        let field = self.span_query.field().unwrap_or_default();
        let field_explanation = Explanation::new(
            tf * self.idf * norm,
            format!(
                "fieldWeight({field}:{} in {doc}), product of:",
                self.span_query.to_string_with_field(Some(field))
            ),
        )
        .with_detail(Explanation::new(tf, format!("tf(phraseFreq={freq})")))
        .with_detail(self.idf_explanation())
        .with_detail(Explanation::new(
            norm,
            format!("fieldNorm(field={field}, doc={doc})"),
        ));

        Ok(Explanation::new(
            query_explanation.value() * field_explanation.value(),
            format!("weight({} in {doc}), product of:", self.query),
        )
        .with_detail(query_explanation)
        .with_detail(field_explanation))
    }
}

/// Scores a document by the sloppy frequency of its spans.
#[derive(Debug)]
pub struct SpanScorer<'r> {
    spans: Box<dyn Spans + 'r>,
    reader: &'r dyn IndexReader,
    field: Option<String>,
    weight_value: f32,
    similarity: Arc<dyn Similarity>,
    /// Whether `spans` is positioned on a span not yet folded into a document.
    more: bool,
    doc: DocId,
    freq: f32,
}

impl<'r> SpanScorer<'r> {
    pub fn new(
        spans: Box<dyn Spans + 'r>,
        reader: &'r dyn IndexReader,
        field: Option<&str>,
        weight_value: f32,
        similarity: Arc<dyn Similarity>,
    ) -> Self {
        SpanScorer {
            spans,
            reader,
            field: field.map(str::to_string),
            weight_value,
            similarity,
            more: true,
            doc: NO_DOC,
            freq: 0.0,
        }
    }

    /// Sloppy frequency of the current document.
    pub fn freq(&self) -> f32 {
        self.freq
    }

    fn field_norm(&self) -> f32 {
        match &self.field {
            Some(field) => self.reader.norm(field, self.doc),
            None => 1.0,
        }
    }

    /// Fold every span of the document `spans` is on into `freq`.
    fn set_freq_current_doc(&mut self) -> Result<bool> {
        if !self.more {
            self.doc = NO_MORE_DOCS;
            return Ok(false);
        }
        self.doc = self.spans.doc();
        self.freq = 0.0;
        while self.more && self.spans.doc() == self.doc {
            let distance = self.spans.end() - self.spans.start();
            self.freq += self.similarity.sloppy_freq(distance);
            self.more = self.spans.next()?;
        }
        Ok(true)
    }
}

impl Scorer for SpanScorer<'_> {
    fn doc(&self) -> DocId {
        self.doc
    }

    fn next(&mut self) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        if self.doc == NO_DOC {
            self.more = self.spans.next()?;
        }
        self.set_freq_current_doc()
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.doc == NO_MORE_DOCS {
            return Ok(false);
        }
        let target = effective_target(self.doc, target);
        if self.doc == NO_DOC || (self.more && self.spans.doc() < target) {
            self.more = self.spans.skip_to(target)?;
        }
        self.set_freq_current_doc()
    }

    fn score(&self) -> f32 {
        assert_positioned(self.doc, "SpanScorer");
        self.similarity.tf(self.freq) * self.weight_value * self.field_norm()
    }
}
