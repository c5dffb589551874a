//! Executes queries against an index reader.

use std::borrow::Cow;
use std::sync::Arc;

use log::{debug, trace};

use crate::config::SearchConfig;
use crate::error::{Result, SarissaError};
use crate::index::{DocId, IndexReader, Term};
use crate::query::Query;
use crate::search::collector::{Collector, TopDocs, TopDocsCollector};
use crate::search::explanation::Explanation;
use crate::search::filter::Filter;
use crate::search::scorer::Scorer;
use crate::search::similarity::{DefaultSimilarity, Similarity};
use crate::search::weight::Weight;

/// Runs queries over one reader.
///
/// Every entry point first rewrites the query to its primitive form, then
/// builds and normalizes a [`Weight`] before scoring.
#[derive(Debug, Clone)]
pub struct Searcher<'r> {
    reader: &'r dyn IndexReader,
    similarity: Arc<dyn Similarity>,
    config: SearchConfig,
}

impl<'r> Searcher<'r> {
    /// Create a searcher with the default similarity and configuration.
    pub fn new(reader: &'r dyn IndexReader) -> Self {
        Searcher {
            reader,
            similarity: Arc::new(DefaultSimilarity),
            config: SearchConfig::default(),
        }
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reader(&self) -> &'r dyn IndexReader {
        self.reader
    }

    pub fn similarity(&self) -> &Arc<dyn Similarity> {
        &self.similarity
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn max_doc(&self) -> DocId {
        self.reader.max_doc()
    }

    pub fn doc_freq(&self, term: &Term) -> Result<i32> {
        self.reader.doc_freq(term)
    }

    /// Rewrite `query` until it no longer changes.
    ///
    /// Fails with [`SarissaError::TooManyClauses`] when the result has more
    /// clauses under one node than the configured maximum.
    pub fn rewrite(&self, query: &Query) -> Result<Query> {
        let mut current = query.clone();
        loop {
            let rewritten = match current.rewrite(self.reader)? {
                Cow::Borrowed(_) => None,
                Cow::Owned(next) => Some(next),
            };
            match rewritten {
                Some(next) => {
                    debug!("rewrote {current} into {next}");
                    current = next;
                }
                None => break,
            }
        }

        let count = current.widest_clause_count();
        if count > self.config.max_clause_count {
            return Err(SarissaError::TooManyClauses {
                count,
                max: self.config.max_clause_count,
            });
        }
        Ok(current)
    }

    /// Rewrite `query`, then build its normalized weight.
    pub fn create_weight(&self, query: &Query) -> Result<Box<dyn Weight>> {
        let rewritten = self.rewrite(query)?;
        let mut weight = rewritten.create_weight(self)?;
        let sum = weight.sum_of_squared_weights()?;
        let norm = self.similarity.query_norm(sum);
        weight.normalize(norm);
        trace!("weight of {rewritten}: sum={sum} norm={norm} value={}", weight.value());
        Ok(weight)
    }

    /// A positioned-before-first scorer for `query`.
    pub fn scorer(&self, query: &Query) -> Result<Box<dyn Scorer + 'r>> {
        self.create_weight(query)?.scorer(self.reader)
    }

    /// Deliver every matching document to `collector`, in document order.
    pub fn search(&self, query: &Query, collector: &mut dyn Collector) -> Result<()> {
        let mut scorer = self.scorer(query)?;
        let mut hits = 0usize;
        while scorer.next()? {
            collector.collect(scorer.doc(), scorer.score())?;
            hits += 1;
        }
        debug!("{query} matched {hits} documents");
        Ok(())
    }

    /// Like [`search`](Self::search), restricted to documents whose bit is
    /// set by `filter`.
    pub fn search_filtered(
        &self,
        query: &Query,
        filter: &dyn Filter,
        collector: &mut dyn Collector,
    ) -> Result<()> {
        let bits = filter.bits(self.reader)?;
        let mut scorer = self.scorer(query)?;
        while scorer.next()? {
            let doc = scorer.doc();
            if bits.get(doc as usize).unwrap_or(false) {
                collector.collect(doc, scorer.score())?;
            }
        }
        Ok(())
    }

    /// The `n` best hits for `query`.
    pub fn top_docs(&self, query: &Query, n: usize) -> Result<TopDocs> {
        let mut collector = TopDocsCollector::new(n);
        self.search(query, &mut collector)?;
        Ok(collector.top_docs())
    }

    /// Explain how `doc` scores against `query`.
    pub fn explain(&self, query: &Query, doc: DocId) -> Result<Explanation> {
        if doc < 0 || doc >= self.reader.max_doc() {
            return Err(SarissaError::invalid_argument(format!(
                "document {doc} is out of range (max_doc = {})",
                self.reader.max_doc()
            )));
        }
        self.create_weight(query)?.explain(self.reader, doc)
    }
}
