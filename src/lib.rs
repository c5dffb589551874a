//! # Sarissa Query
//!
//! The query-evaluation core of the Sarissa full-text search library.
//!
//! ## Features
//!
//! - Query types with boosts, structural equality, hashing and rendering
//! - Rewriting of wildcard and span multi-term queries against an index
//! - Weights and document-at-a-time scorers with skip-ahead
//! - Span queries and a merged span disjunction
//! - A character-level lexer for the classic query syntax
//! - An in-memory positional index for tests and tooling

pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod query;
pub mod query_parser;
pub mod search;

pub mod prelude {
    pub use crate::config::SearchConfig;
    pub use crate::error::{Result, SarissaError};
    pub use crate::index::{DocId, IndexReader, MemoryIndex, NO_DOC, NO_MORE_DOCS, Term};
    pub use crate::query::span::{SpanOrQuery, SpanQuery, SpanTermQuery, Spans};
    pub use crate::query::{BooleanQuery, MatchAllDocsQuery, Query, TermQuery, WildcardQuery};
    pub use crate::query_parser::{Token, TokenKind, TokenList, tokenize};
    pub use crate::search::{Collector, Scorer, Searcher, Weight};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
