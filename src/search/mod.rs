//! Weights, scorers, similarity and the searcher that drives them.

pub mod collector;
pub mod explanation;
pub mod filter;
pub mod scorer;
pub mod searcher;
pub mod similarity;
pub mod weight;

pub use self::collector::{Collector, DocCollector, ScoreDoc, TopDocs, TopDocsCollector};
pub use self::explanation::Explanation;
pub use self::filter::Filter;
pub use self::scorer::{EmptyScorer, Scorer};
pub use self::searcher::Searcher;
pub use self::similarity::{DefaultSimilarity, Similarity};
pub use self::weight::Weight;
