//! Shared checks for the query, weight and scorer contracts.

#![allow(dead_code)]

use sarissa_query::prelude::*;
use sarissa_query::search::{ScoreDoc, Scorer};

const SCORE_TOLERANCE: f32 = 1e-5;

/// An in-memory index with one `body` field per document.
pub fn index_of(bodies: &[&str]) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    for body in bodies {
        index.add_document([("body", *body)]);
    }
    index
}

/// A query of a different kind than `query`, with the same boost.
fn whacky_query(query: &Query) -> Query {
    let whacky: Query = match query {
        Query::MatchAllDocs(_) => TermQuery::new("whacky", "query").into(),
        _ => MatchAllDocsQuery::new().into(),
    };
    whacky.with_boost(query.boost())
}

/// `a` and `b` are equal both ways and hash alike.
pub fn check_equal(a: &Query, b: &Query) {
    assert_eq!(a, b, "{a} should equal {b}");
    assert_eq!(b, a, "{b} should equal {a}");
    assert_eq!(a.hash_code(), b.hash_code(), "{a} and {b} should hash alike");
}

/// `a` and `b` differ both ways and hash differently.
pub fn check_unequal(a: &Query, b: &Query) {
    assert_ne!(a, b, "{a} should not equal {b}");
    assert_ne!(b, a, "{b} should not equal {a}");
    assert_ne!(a.hash_code(), b.hash_code(), "{a} and {b} should hash apart");
}

/// Clones are equal; boosted clones and queries of other kinds are not.
pub fn check_hash_equals(query: &Query) {
    let copy = query.clone();
    check_equal(query, &copy);

    let boosted = copy.with_boost(query.boost() + 1.0);
    check_unequal(query, &boosted);

    check_unequal(query, &whacky_query(query));
}

/// Every hit of a full search, in document order.
pub fn all_hits(searcher: &Searcher<'_>, query: &Query) -> Vec<ScoreDoc> {
    let mut hits = Vec::new();
    let mut collect = |doc: DocId, score: f32| -> Result<()> {
        hits.push(ScoreDoc { doc, score });
        Ok(())
    };
    searcher.search(query, &mut collect).unwrap();
    hits
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Op {
    Next,
    SkipTo,
}

const OP_ORDERS: &[&[Op]] = &[
    &[Op::Next],
    &[Op::SkipTo],
    &[Op::SkipTo, Op::Next],
    &[Op::Next, Op::SkipTo],
    &[Op::SkipTo, Op::SkipTo, Op::Next, Op::Next],
    &[Op::Next, Op::Next, Op::SkipTo, Op::SkipTo],
    &[Op::SkipTo, Op::SkipTo, Op::SkipTo, Op::Next, Op::Next],
];

fn advance(scorer: &mut dyn Scorer, op: Op, last: DocId) -> bool {
    match op {
        Op::Next => scorer.next().unwrap(),
        Op::SkipTo => scorer.skip_to(last + 1).unwrap(),
    }
}

/// Interleaving `next` and `skip_to(last + 1)` visits the same documents
/// with the same scores as a plain search.
pub fn check_skip_to(searcher: &Searcher<'_>, query: &Query) {
    let expected = all_hits(searcher, query);
    for order in OP_ORDERS {
        let mut scorer = searcher.scorer(query).unwrap();
        let mut last = NO_DOC;
        for (i, hit) in expected.iter().enumerate() {
            let op = order[i % order.len()];
            assert!(
                advance(scorer.as_mut(), op, last),
                "{query}: {op:?} after {last} should reach {}",
                hit.doc
            );
            assert_eq!(scorer.doc(), hit.doc, "{query}: {op:?} after {last}");
            assert!(
                (scorer.score() - hit.score).abs() < SCORE_TOLERANCE,
                "{query}: score of {} differs: {} vs {}",
                hit.doc,
                scorer.score(),
                hit.score
            );
            last = hit.doc;
        }
        let op = order[expected.len() % order.len()];
        assert!(
            !advance(scorer.as_mut(), op, last),
            "{query}: {op:?} past the last hit should fail"
        );
        assert!(!scorer.next().unwrap(), "{query}: exhausted scorer moved");
    }
}

/// A fresh scorer's first `skip_to(doc)` lands on every hit.
pub fn check_first_skip_to(searcher: &Searcher<'_>, query: &Query) {
    for hit in all_hits(searcher, query) {
        let mut scorer = searcher.scorer(query).unwrap();
        assert!(scorer.skip_to(hit.doc).unwrap(), "{query}: skip_to({})", hit.doc);
        assert_eq!(scorer.doc(), hit.doc);
        assert!((scorer.score() - hit.score).abs() < SCORE_TOLERANCE);
    }
}

/// All checks that need no index, then all that do.
pub fn check(searcher: &Searcher<'_>, query: &Query) {
    check_hash_equals(query);
    check_skip_to(searcher, query);
    check_first_skip_to(searcher, query);
}
