//! Query that matches every live document.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::{DocId, IndexReader, NO_DOC, NO_MORE_DOCS};
use crate::query::{Query, boost_bits, boost_suffix, check_boost, default_boost};
use crate::search::explanation::Explanation;
use crate::search::scorer::{Scorer, assert_positioned, effective_target};
use crate::search::Weight;

const MATCH_ALL_SEED: u64 = 0x1AA7_1190;

/// Matches all non-deleted documents, each with the same score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAllDocsQuery {
    #[serde(default = "default_boost")]
    boost: f32,
}

impl Default for MatchAllDocsQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchAllDocsQuery {
    pub fn new() -> Self {
        MatchAllDocsQuery { boost: 1.0 }
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
        boost_bits(self.boost) ^ MATCH_ALL_SEED
    }

    /// The field is ignored; there is nothing to qualify.
    pub fn to_string_with_field(&self, _default_field: Option<&str>) -> String {
        format!("MatchAllDocsQuery{}", boost_suffix(self.boost))
    }
}

/// Weight of a [`MatchAllDocsQuery`]: the boost, normalized.
#[derive(Debug)]
pub struct MatchAllDocsWeight {
    query: Query,
    boost: f32,
    query_weight: f32,
    query_norm: f32,
}

impl MatchAllDocsWeight {
    pub fn new(query: &MatchAllDocsQuery) -> Self {
        MatchAllDocsWeight {
            query: Query::MatchAllDocs(query.clone()),
            boost: query.boost(),
            query_weight: query.boost(),
            query_norm: 1.0,
        }
    }
}

impl Weight for MatchAllDocsWeight {
    fn query(&self) -> &Query {
        &self.query
    }

    fn value(&self) -> f32 {
        self.query_weight
    }

    fn sum_of_squared_weights(&mut self) -> Result<f32> {
        self.query_weight = self.boost;
        Ok(self.query_weight * self.query_weight)
    }

    fn normalize(&mut self, query_norm: f32) {
        self.query_norm = query_norm;
        self.query_weight *= query_norm;
    }

    fn scorer<'r>(&self, reader: &'r dyn IndexReader) -> Result<Box<dyn Scorer + 'r>> {
        Ok(Box::new(MatchAllScorer::new(reader, self.query_weight)))
    }

    fn explain(&self, reader: &dyn IndexReader, doc: DocId) -> Result<Explanation> {
        if doc < 0 || doc >= reader.max_doc() || reader.is_deleted(doc) {
            return Ok(Explanation::no_match(format!("document {doc} is deleted")));
        }
        let mut explanation = Explanation::new(self.query_weight, "MatchAllDocsQuery, product of:");
        if self.boost != 1.0 {
            explanation.add_detail(Explanation::new(self.boost, "boost"));
        }
        explanation.add_detail(Explanation::new(self.query_norm, "queryNorm"));
        Ok(explanation)
    }
}

/// Walks document numbers `0..max_doc`, skipping deleted ones.
#[derive(Debug)]
pub struct MatchAllScorer<'r> {
    reader: &'r dyn IndexReader,
    id: DocId,
    max_id: DocId,
    score: f32,
}

impl<'r> MatchAllScorer<'r> {
    pub fn new(reader: &'r dyn IndexReader, score: f32) -> Self {
        MatchAllScorer {
            reader,
            id: NO_DOC,
            max_id: reader.max_doc() - 1,
            score,
        }
    }
}

impl Scorer for MatchAllScorer<'_> {
    fn doc(&self) -> DocId {
        self.id
    }

    fn next(&mut self) -> Result<bool> {
        if self.id == NO_MORE_DOCS {
            return Ok(false);
        }
        while self.id < self.max_id {
            self.id += 1;
            if !self.reader.is_deleted(self.id) {
                return Ok(true);
            }
        }
        self.id = NO_MORE_DOCS;
        Ok(false)
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        let target = effective_target(self.id, target);
        if target == NO_MORE_DOCS {
            self.id = NO_MORE_DOCS;
            return Ok(false);
        }
        self.id = target - 1;
        self.next()
    }

    fn score(&self) -> f32 {
        assert_positioned(self.id, "MatchAllScorer");
        self.score
    }
}
