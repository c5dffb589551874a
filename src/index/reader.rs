//! Index reader interfaces consumed by queries, weights and scorers.
//!
//! The storage behind these traits is not part of this crate; anything that
//! can enumerate terms and walk postings in document order can back a
//! search. [`MemoryIndex`](crate::index::memory::MemoryIndex) is the
//! in-process implementation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::index::DocId;

/// A word from a field of a document. Terms order by field, then text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term {
    field: String,
    text: String,
}

impl Term {
    /// Create a new term.
    pub fn new<F, T>(field: F, text: T) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Term {
            field: field.into(),
            text: text.into(),
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the term text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// A term in the same field with different text.
    pub fn with_text<T: Into<String>>(&self, text: T) -> Self {
        Term::new(self.field.clone(), text)
    }

    /// Stable hash of the term, independent of the process hasher seed.
    pub fn hash_code(&self) -> u64 {
        string_hash(&self.field).wrapping_mul(31) ^ string_hash(&self.text)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.text)
    }
}

/// Polynomial string hash (`h = 31 * h + c`).
pub(crate) fn string_hash(s: &str) -> u64 {
    s.chars()
        .fold(0u64, |h, c| h.wrapping_mul(31).wrapping_add(c as u64))
}

/// Read access to an index.
pub trait IndexReader: fmt::Debug {
    /// One greater than the largest document number, deleted or not.
    fn max_doc(&self) -> DocId;

    /// Number of live (non-deleted) documents.
    fn num_docs(&self) -> i32;

    /// Whether the document has been deleted.
    fn is_deleted(&self, doc: DocId) -> bool;

    /// Number of documents containing the term.
    fn doc_freq(&self, term: &Term) -> Result<i32>;

    /// Enumerate terms starting at the first term greater than or equal to
    /// `start`, in term order.
    fn terms_from(&self, start: &Term) -> Result<Box<dyn TermEnum + '_>>;

    /// An unpositioned cursor over (document, frequency) pairs; call
    /// [`TermDocs::seek`] before iterating.
    fn term_docs(&self) -> Result<Box<dyn TermDocs + '_>>;

    /// An unpositioned cursor over documents and positions.
    fn term_positions(&self) -> Result<Box<dyn TermPositions + '_>>;

    /// Normalization factor of a field in a document.
    fn norm(&self, field: &str, doc: DocId) -> f32 {
        let _ = (field, doc);
        1.0
    }

    /// A cursor already seeked to `term`.
    fn term_docs_for(&self, term: &Term) -> Result<Box<dyn TermDocs + '_>> {
        let mut docs = self.term_docs()?;
        docs.seek(term)?;
        Ok(docs)
    }

    /// A positions cursor already seeked to `term`.
    fn term_positions_for(&self, term: &Term) -> Result<Box<dyn TermPositions + '_>> {
        let mut positions = self.term_positions()?;
        positions.seek(term)?;
        Ok(positions)
    }
}

/// Enumerates terms in order.
pub trait TermEnum: fmt::Debug {
    /// The current term, or `None` once the enumeration is exhausted.
    fn term(&self) -> Option<&Term>;

    /// Document frequency of the current term.
    fn doc_freq(&self) -> i32;

    /// Move to the next term.
    fn next(&mut self) -> Result<bool>;

    /// Release the enumeration.
    fn close(&mut self) -> Result<()>;
}

/// Iterates the documents containing a term, in increasing document order.
/// Deleted documents are never returned.
pub trait TermDocs: fmt::Debug {
    /// Position the cursor before the first document of `term`.
    fn seek(&mut self, term: &Term) -> Result<()>;

    /// Current document.
    fn doc(&self) -> DocId;

    /// Frequency of the term in the current document.
    fn freq(&self) -> i32;

    /// Move to the next document.
    fn next(&mut self) -> Result<bool>;

    /// Move to the first document at or beyond `target`. Always advances at
    /// least one entry.
    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        loop {
            if !self.next()? {
                return Ok(false);
            }
            if self.doc() >= target {
                return Ok(true);
            }
        }
    }

    /// Release the cursor.
    fn close(&mut self) -> Result<()>;
}

/// A [`TermDocs`] that also reports the positions of each occurrence.
pub trait TermPositions: TermDocs {
    /// Next position of the term in the current document. Must be called at
    /// most [`freq`](TermDocs::freq) times per document.
    fn next_position(&mut self) -> Result<i32>;
}
