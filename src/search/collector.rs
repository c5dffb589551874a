//! Collector implementations for gathering search results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::DocId;

/// Receives every (document, score) pair of a search, in document order.
pub trait Collector {
    /// Collect a document hit.
    fn collect(&mut self, doc: DocId, score: f32) -> Result<()>;
}

impl<F> Collector for F
where
    F: FnMut(DocId, f32) -> Result<()>,
{
    fn collect(&mut self, doc: DocId, score: f32) -> Result<()> {
        self(doc, score)
    }
}

/// A document and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreDoc {
    pub doc: DocId,
    pub score: f32,
}

/// The best hits of a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDocs {
    /// Number of documents that matched.
    pub total_hits: usize,
    /// Hits by descending score, ties by ascending document.
    pub score_docs: Vec<ScoreDoc>,
    /// The highest score, or 0 with no hits.
    pub max_score: f32,
}

/// Heap entry; the "greatest" entry is the worst hit so it can be evicted.
#[derive(Debug, Clone, Copy)]
struct Ranked(ScoreDoc);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower scores are worse; among equal scores, later documents are worse.
        other
            .0
            .score
            .partial_cmp(&self.0.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.0.doc.cmp(&other.0.doc))
    }
}

/// A collector that keeps the top N documents by score.
#[derive(Debug)]
pub struct TopDocsCollector {
    /// Maximum number of documents to keep.
    max_docs: usize,
    /// Kept hits; the top of the heap is the worst of them.
    hits: BinaryHeap<Ranked>,
    /// Total number of documents collected.
    total_hits: usize,
    max_score: f32,
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::new(),
            total_hits: 0,
            max_score: 0.0,
        }
    }

    /// Get the maximum number of documents to keep.
    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    /// Get the total number of hits collected.
    pub fn total_hits(&self) -> usize {
        self.total_hits
    }

    /// The collected hits, best first.
    pub fn top_docs(self) -> TopDocs {
        let mut score_docs: Vec<ScoreDoc> = self.hits.into_iter().map(|r| r.0).collect();
        score_docs.sort_by(|a, b| Ranked(*a).cmp(&Ranked(*b)));
        TopDocs {
            total_hits: self.total_hits,
            score_docs,
            max_score: self.max_score,
        }
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc: DocId, score: f32) -> Result<()> {
        self.total_hits += 1;
        if self.total_hits == 1 || score > self.max_score {
            self.max_score = score;
        }
        if self.max_docs == 0 {
            return Ok(());
        }

        let hit = Ranked(ScoreDoc { doc, score });
        if self.hits.len() < self.max_docs {
            self.hits.push(hit);
        } else if let Some(mut worst) = self.hits.peek_mut()
            && hit < *worst
        {
            *worst = hit;
        }
        Ok(())
    }
}

/// Collects every hit, in the order it was delivered.
#[derive(Debug, Default, Clone)]
pub struct DocCollector {
    hits: Vec<ScoreDoc>,
}

impl DocCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> &[ScoreDoc] {
        &self.hits
    }

    /// Collected document numbers.
    pub fn docs(&self) -> Vec<DocId> {
        self.hits.iter().map(|h| h.doc).collect()
    }

    pub fn into_hits(self) -> Vec<ScoreDoc> {
        self.hits
    }
}

impl Collector for DocCollector {
    fn collect(&mut self, doc: DocId, score: f32) -> Result<()> {
        self.hits.push(ScoreDoc { doc, score });
        Ok(())
    }
}
