//! Disjunction of span queries.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::collections::binary_heap::PeekMut;
use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SarissaError};
use crate::index::{DocId, IndexReader, NO_DOC, NO_MORE_DOCS, Term};
use crate::query::span::{EmptySpans, SpanQuery, Spans};
use crate::query::{boost_bits, boost_suffix, check_boost, default_boost};

/// Matches the union of its clauses' spans. All clauses share one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpanOrQuerySpec", into = "SpanOrQuerySpec")]
pub struct SpanOrQuery {
    clauses: Vec<SpanQuery>,
    field: Option<String>,
    boost: f32,
}

#[derive(Serialize, Deserialize)]
struct SpanOrQuerySpec {
    #[serde(default)]
    clauses: Vec<SpanQuery>,
    #[serde(default = "default_boost")]
    boost: f32,
}

impl TryFrom<SpanOrQuerySpec> for SpanOrQuery {
    type Error = SarissaError;

    fn try_from(spec: SpanOrQuerySpec) -> Result<Self> {
        let mut query = SpanOrQuery::new(spec.clauses)?;
        if spec.boost.is_nan() {
            return Err(SarissaError::invalid_argument("boost must not be NaN"));
        }
        query.boost = spec.boost;
        Ok(query)
    }
}

impl From<SpanOrQuery> for SpanOrQuerySpec {
    fn from(query: SpanOrQuery) -> Self {
        SpanOrQuerySpec {
            clauses: query.clauses,
            boost: query.boost,
        }
    }
}

impl SpanOrQuery {
    /// Fails if the clauses are not all in the same field.
    pub fn new(clauses: Vec<SpanQuery>) -> Result<Self> {
        let mut field: Option<String> = None;
        for clause in &clauses {
            let Some(clause_field) = clause.field() else {
                continue;
            };
            match &field {
                None => field = Some(clause_field.to_string()),
                Some(field) if field != clause_field => {
                    return Err(SarissaError::invalid_argument(format!(
                        "span or clauses must share one field: {field} vs {clause_field}"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(SpanOrQuery {
            clauses,
            field,
            boost: 1.0,
        })
    }

    pub fn clauses(&self) -> &[SpanQuery] {
        &self.clauses
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
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

    /// Order-sensitive combination of the clause hashes and the boost.
    pub fn hash_code(&self) -> u64 {
        let mut h = 1u64;
        for clause in &self.clauses {
            h = h.wrapping_mul(31).wrapping_add(clause.hash_code());
        }
        h ^= (h << 10) | (h >> 23);
        h ^ boost_bits(self.boost)
    }

    pub fn to_string_with_field(&self, default_field: Option<&str>) -> String {
        let clauses: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| clause.to_string_with_field(default_field))
            .collect();
        format!("spanOr([{}]){}", clauses.join(", "), boost_suffix(self.boost))
    }

    pub fn extract_terms(&self, terms: &mut AHashSet<Term>) -> Result<()> {
        for clause in &self.clauses {
            clause.extract_terms(terms)?;
        }
        Ok(())
    }

    /// A new query when any clause rewrote; this one is left untouched.
    pub fn rewrite(&self, reader: &dyn IndexReader) -> Result<Option<SpanOrQuery>> {
        let mut clauses: Option<Vec<SpanQuery>> = None;
        for (i, clause) in self.clauses.iter().enumerate() {
            if let Some(rewritten) = clause.rewrite(reader)? {
                clauses.get_or_insert_with(|| self.clauses.clone())[i] = rewritten;
            }
        }
        let Some(clauses) = clauses else {
            return Ok(None);
        };
        // The field is derived again from the rewritten clauses.
        Ok(Some(SpanOrQuery::new(clauses)?.with_boost(self.boost)))
    }

    pub fn get_spans<'r>(&self, reader: &'r dyn IndexReader) -> Result<Box<dyn Spans + 'r>> {
        match self.clauses.as_slice() {
            [] => Ok(Box::new(EmptySpans::new())),
            [clause] => clause.get_spans(reader),
            clauses => {
                let children = clauses
                    .iter()
                    .map(|clause| clause.get_spans(reader))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Box::new(SpanOrSpans::new(
                    children,
                    self.to_string_with_field(None),
                )))
            }
        }
    }
}

/// A child spans ordered by its current (doc, start, end).
#[derive(Debug)]
struct QueuedSpans<'r> {
    spans: Box<dyn Spans + 'r>,
}

impl QueuedSpans<'_> {
    fn key(&self) -> (DocId, i32, i32) {
        (self.spans.doc(), self.spans.start(), self.spans.end())
    }
}

impl PartialEq for QueuedSpans<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedSpans<'_> {}

impl PartialOrd for QueuedSpans<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedSpans<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on (doc, start, end)
        other.key().cmp(&self.key())
    }
}

/// Merges the spans of several clauses into one ordered stream.
#[derive(Debug)]
pub struct SpanOrSpans<'r> {
    /// Children not yet advanced; moved into the queue on first use.
    pending: Option<Vec<Box<dyn Spans + 'r>>>,
    queue: BinaryHeap<QueuedSpans<'r>>,
    description: String,
}

impl<'r> SpanOrSpans<'r> {
    pub fn new(children: Vec<Box<dyn Spans + 'r>>, description: String) -> Self {
        let capacity = children.len();
        SpanOrSpans {
            pending: Some(children),
            queue: BinaryHeap::with_capacity(capacity),
            description,
        }
    }

    /// Advance every pending child and queue those that are positioned.
    fn init(&mut self, target: Option<DocId>) -> Result<bool> {
        for mut spans in self.pending.take().unwrap_or_default() {
            let positioned = match target {
                Some(target) => spans.skip_to(target)?,
                None => spans.next()?,
            };
            if positioned {
                self.queue.push(QueuedSpans { spans });
            }
        }
        Ok(!self.queue.is_empty())
    }

    fn top(&self) -> Option<&dyn Spans> {
        self.queue.peek().map(|queued| queued.spans.as_ref())
    }
}

impl Spans for SpanOrSpans<'_> {
    fn next(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return self.init(None);
        }
        let Some(mut top) = self.queue.peek_mut() else {
            return Ok(false);
        };
        if top.spans.next()? {
            return Ok(true);
        }
        PeekMut::pop(top);
        Ok(!self.queue.is_empty())
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        if self.pending.is_some() {
            return self.init(Some(target));
        }
        while let Some(mut top) = self.queue.peek_mut() {
            if top.spans.doc() >= target {
                break;
            }
            if !top.spans.skip_to(target)? {
                PeekMut::pop(top);
            }
        }
        Ok(!self.queue.is_empty())
    }

    fn doc(&self) -> DocId {
        match self.top() {
            Some(top) => top.doc(),
            None if self.pending.is_some() => NO_DOC,
            None => NO_MORE_DOCS,
        }
    }

    fn start(&self) -> i32 {
        self.top().map_or(-1, |top| top.start())
    }

    fn end(&self) -> i32 {
        self.top().map_or(-1, |top| top.end())
    }
}

impl fmt::Display for SpanOrSpans<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spans({})@", self.description)?;
        match self.doc() {
            NO_DOC => f.write_str("START"),
            NO_MORE_DOCS => f.write_str("END"),
            doc => write!(f, "{doc}:{}-{}", self.start(), self.end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::MemoryIndex;
    use crate::query::WildcardQuery;
    use crate::query::span::{SpanMultiTermQuery, SpanTermQuery};

    fn term(text: &str) -> SpanQuery {
        SpanTermQuery::new("body", text).into()
    }

    fn collect(spans: &mut dyn Spans) -> Vec<(DocId, i32, i32)> {
        let mut seen = Vec::new();
        while spans.next().unwrap() {
            seen.push((spans.doc(), spans.start(), spans.end()));
        }
        seen
    }

    #[test]
    fn test_merges_in_position_order() {
        let mut index = MemoryIndex::new();
        index.add_document([("body", "x y")]);
        index.add_document([("body", "a b a b")]);
        index.add_document([("body", "b")]);

        let query = SpanOrQuery::new(vec![term("b"), term("a")]).unwrap();
        let mut spans = query.get_spans(&index).unwrap();
        assert_eq!(
            collect(spans.as_mut()),
            vec![(1, 0, 1), (1, 1, 2), (1, 2, 3), (1, 3, 4), (2, 0, 1)]
        );
        assert!(!spans.next().unwrap());
        drop(spans);
        assert_eq!(index.open_cursors(), 0);
    }

    #[test]
    fn test_skip_to_initializes_queue() {
        let mut index = MemoryIndex::new();
        index.add_document([("body", "a")]);
        index.add_document([("body", "c")]);
        index.add_document([("body", "b")]);
        index.add_document([("body", "a b")]);

        let query = SpanOrQuery::new(vec![term("a"), term("b")]).unwrap();
        let mut spans = query.get_spans(&index).unwrap();
        assert_eq!(spans.doc(), NO_DOC);
        assert!(spans.skip_to(1).unwrap());
        assert_eq!(spans.doc(), 2);
        assert!(spans.skip_to(2).unwrap());
        assert_eq!(spans.doc(), 2);
        assert!(spans.skip_to(3).unwrap());
        assert_eq!((spans.doc(), spans.start()), (3, 0));
        assert!(spans.next().unwrap());
        assert_eq!((spans.doc(), spans.start()), (3, 1));
        assert!(!spans.next().unwrap());
        assert_eq!(spans.doc(), NO_MORE_DOCS);
    }

    #[test]
    fn test_clause_count_shapes() {
        let mut index = MemoryIndex::new();
        index.add_document([("body", "a")]);

        let empty = SpanOrQuery::new(Vec::new()).unwrap();
        assert_eq!(empty.field(), None);
        let mut spans = empty.get_spans(&index).unwrap();
        assert!(!spans.next().unwrap());

        let single = SpanOrQuery::new(vec![term("a")]).unwrap();
        let spans = single.get_spans(&index).unwrap();
        assert!(spans.to_string().starts_with("spans(body:a)"));
    }

    #[test]
    fn test_rejects_mixed_fields() {
        let clauses = vec![term("a"), SpanTermQuery::new("title", "a").into()];
        assert!(SpanOrQuery::new(clauses).is_err());
    }

    #[test]
    fn test_order_matters_for_equality_and_hash() {
        let ab = SpanOrQuery::new(vec![term("a"), term("b")]).unwrap();
        let ba = SpanOrQuery::new(vec![term("b"), term("a")]).unwrap();
        assert_ne!(ab, ba);
        assert_ne!(ab.hash_code(), ba.hash_code());
        assert_eq!(ab.hash_code(), ab.clone().hash_code());
    }

    #[test]
    fn test_render() {
        let query = SpanOrQuery::new(vec![term("a"), term("b")])
            .unwrap()
            .with_boost(2.0);
        assert_eq!(query.to_string_with_field(None), "spanOr([body:a, body:b])^2.0");
        assert_eq!(query.to_string_with_field(Some("body")), "spanOr([a, b])^2.0");
    }

    #[test]
    fn test_rewrite_derives_field_from_rewritten_clauses() {
        let mut index = MemoryIndex::new();
        index.add_document([("body", "apple apricot")]);

        let expanding = SpanOrQuery::new(vec![
            SpanMultiTermQuery::new(WildcardQuery::new("body", "ap*")).into(),
        ])
        .unwrap()
        .with_boost(3.0);
        let rewritten = expanding.rewrite(&index).unwrap().unwrap();
        assert_eq!(rewritten.field(), Some("body"));
        assert_eq!(rewritten.boost(), 3.0);
        assert_eq!(expanding.field(), Some("body"));

        let vanishing =
            SpanOrQuery::new(vec![SpanMultiTermQuery::new(WildcardQuery::new("body", "zz*")).into()])
                .unwrap();
        let rewritten = vanishing.rewrite(&index).unwrap().unwrap();
        let expected = SpanOrQuery::new(vec![SpanOrQuery::new(Vec::new()).unwrap().into()]).unwrap();
        assert_eq!(rewritten, expected);
        assert_eq!(rewritten.field(), None);
    }
}
