//! Document-at-a-time scoring iterators.

use std::fmt::Debug;

use crate::error::Result;
use crate::index::{DocId, NO_DOC, NO_MORE_DOCS};

/// A forward-only cursor over matching documents, in increasing order.
///
/// A scorer starts before its first match, where `doc()` is [`NO_DOC`].
/// Once `next` or `skip_to` returns `false` the scorer is exhausted and
/// stays so.
pub trait Scorer: Debug {
    /// The current document.
    fn doc(&self) -> DocId;

    /// Move to the next matching document.
    fn next(&mut self) -> Result<bool>;

    /// Move to the first matching document at or beyond `target`. A target
    /// at or before the current document is treated as `doc() + 1`; the
    /// scorer never moves backwards.
    fn skip_to(&mut self, target: DocId) -> Result<bool>;

    /// Score of the current document.
    ///
    /// # Panics
    ///
    /// Panics when the scorer is not positioned on a document.
    fn score(&self) -> f32;
}

/// The target a monotonic `skip_to` actually seeks to.
pub(crate) fn effective_target(current: DocId, target: DocId) -> DocId {
    if current == NO_MORE_DOCS {
        return NO_MORE_DOCS;
    }
    target.max(current.saturating_add(1))
}

/// Fails loudly when a score is requested off a document.
pub(crate) fn assert_positioned(doc: DocId, scorer: &str) {
    assert!(
        doc != NO_DOC && doc != NO_MORE_DOCS,
        "{scorer}: score() called while not positioned on a document (doc = {doc})"
    );
}

/// A scorer that matches no documents.
#[derive(Debug, Default)]
pub struct EmptyScorer {
    exhausted: bool,
}

impl EmptyScorer {
    /// Create a new empty scorer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scorer for EmptyScorer {
    fn doc(&self) -> DocId {
        if self.exhausted { NO_MORE_DOCS } else { NO_DOC }
    }

    fn next(&mut self) -> Result<bool> {
        self.exhausted = true;
        Ok(false)
    }

    fn skip_to(&mut self, _target: DocId) -> Result<bool> {
        self.exhausted = true;
        Ok(false)
    }

    fn score(&self) -> f32 {
        assert_positioned(self.doc(), "EmptyScorer");
        0.0
    }
}
