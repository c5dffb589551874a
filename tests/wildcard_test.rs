//! Wildcard rewriting, filtering and searching through the searcher.

mod common;

use sarissa_query::prelude::*;
use sarissa_query::query::WildcardFilter;
use sarissa_query::search::{DocCollector, Filter};

fn corpus() -> MemoryIndex {
    common::index_of(&[
        "test text",
        "tent",
        "toast",
        "best test",
        "",
        "texture tests",
    ])
}

#[test]
fn test_literal_pattern_becomes_term_query() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    let rewritten = searcher
        .rewrite(&WildcardQuery::new("body", "tent").with_boost(2.0).into())
        .unwrap();
    assert_eq!(rewritten, TermQuery::new("body", "tent").with_boost(2.0).into());
}

#[test]
fn test_pattern_expands_to_matching_terms() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    let rewritten = searcher
        .rewrite(&WildcardQuery::new("body", "te?t").into())
        .unwrap();
    assert_eq!(rewritten.to_string_with_field(Some("body")), "tent test text");

    let Query::Boolean(expansion) = rewritten else {
        panic!("expected a boolean expansion");
    };
    assert!(expansion.is_coord_disabled());
}

#[test]
fn test_rewrite_is_idempotent() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    for pattern in ["t*", "te?t", "text", "zz*", "tex*"] {
        let query: Query = WildcardQuery::new("body", pattern).into();
        let once = searcher.rewrite(&query).unwrap();
        let twice = searcher.rewrite(&once).unwrap();
        assert_eq!(once, twice, "pattern {pattern}");
        assert!(matches!(once.rewrite(&index).unwrap(), std::borrow::Cow::Borrowed(_)));
    }
}

#[test]
fn test_search_matches_every_expanded_term() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    let hits = common::all_hits(&searcher, &WildcardQuery::new("body", "te*").into());
    let docs: Vec<DocId> = hits.iter().map(|hit| hit.doc).collect();
    assert_eq!(docs, vec![0, 1, 3, 5]);
}

#[test]
fn test_expansion_scorer_contract() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    common::check(&searcher, &WildcardQuery::new("body", "t*t").into());
    common::check(&searcher, &WildcardQuery::new("body", "te*").with_boost(3.0).into());
}

#[test]
fn test_clause_limit() {
    let index = corpus();
    let searcher = Searcher::new(&index).with_config(SearchConfig::default().with_max_clause_count(2));
    let err = searcher
        .rewrite(&WildcardQuery::new("body", "t*").into())
        .unwrap_err();
    assert!(matches!(err, SarissaError::TooManyClauses { max: 2, .. }));

    assert!(searcher.rewrite(&WildcardQuery::new("body", "tex*").into()).is_ok());
}

#[test]
fn test_unrewritten_wildcard_cannot_be_weighted() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    let query: Query = WildcardQuery::new("body", "t*").into();
    assert!(matches!(
        query.create_weight(&searcher),
        Err(SarissaError::Unsupported(_))
    ));
    assert!(searcher.create_weight(&query).is_ok());
}

#[test]
fn test_filter_sets_one_bit_per_matching_document() {
    let index = corpus();
    let filter = WildcardFilter::new(Term::new("body", "*st"));
    let bits = filter.bits(&index).unwrap();
    assert_eq!(bits.len(), index.max_doc() as usize);
    let set: Vec<usize> = (0..bits.len()).filter(|&i| bits[i]).collect();
    assert_eq!(set, vec![0, 2, 3]);
    assert_eq!(index.open_cursors(), 0);
}

#[test]
fn test_filter_without_matches_releases_cursors() {
    let index = corpus();
    let bits = WildcardFilter::new(Term::new("body", "q*")).bits(&index).unwrap();
    assert!(bits.none());
    let bits = WildcardFilter::new(Term::new("missing", "*")).bits(&index).unwrap();
    assert!(bits.none());
    assert_eq!(index.open_cursors(), 0);
}

#[test]
fn test_filtered_search() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    let mut collector = DocCollector::new();
    searcher
        .search_filtered(
            &MatchAllDocsQuery::new().into(),
            &WildcardFilter::new(Term::new("body", "te*")),
            &mut collector,
        )
        .unwrap();
    assert_eq!(collector.docs(), vec![0, 1, 3, 5]);
}

#[test]
fn test_top_docs_orders_by_score() {
    let index = corpus();
    let searcher = Searcher::new(&index);
    let query: Query = BooleanQuery::new()
        .with_clause(TermQuery::new("body", "test").into())
        .with_clause(TermQuery::new("body", "text").into())
        .into();
    let top = searcher.top_docs(&query, 1).unwrap();
    assert_eq!(top.total_hits, 2);
    assert_eq!(top.score_docs.len(), 1);
    // Doc 0 matches both clauses.
    assert_eq!(top.score_docs[0].doc, 0);
    assert_eq!(top.max_score, top.score_docs[0].score);
}

#[test]
fn test_filter_renders_as_its_term() {
    let filter = WildcardFilter::new(Term::new("body", "appl*"));
    assert_eq!(filter.to_string(), "body:appl*");
    assert_eq!(WildcardFilter::new(Term::new("title", "te?t")).to_string(), "title:te?t");
    assert_eq!(WildcardFilter::new(Term::new("", "te?t")).to_string(), "te?t");
}
