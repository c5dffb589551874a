//! In-memory index for tests, benchmarks and the command line tool.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::collections::btree_map;

use ahash::AHashMap;
use bit_vec::BitVec;

use crate::error::{Result, SarissaError};
use crate::index::reader::{IndexReader, Term, TermDocs, TermEnum, TermPositions};
use crate::index::{DocId, NO_DOC, NO_MORE_DOCS};
use crate::search::similarity::{DefaultSimilarity, Similarity};

/// Occurrences of one term in one document.
#[derive(Debug, Clone)]
struct Posting {
    doc: DocId,
    positions: Vec<i32>,
}

/// A positional inverted index held entirely in memory.
///
/// Field values are split on whitespace and lower-cased. Documents are
/// numbered in insertion order from 0. Deleting a document only marks it;
/// its postings are skipped by every cursor.
///
/// Query terms are looked up verbatim, so they must already be lower-case
/// to match: `body:Quick` finds nothing where `body:quick` does.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    /// Postings per term, in term order.
    postings: BTreeMap<Term, Vec<Posting>>,
    /// Deletion marks, one bit per document.
    deleted: BitVec,
    /// Length norm per field, indexed by document.
    norms: AHashMap<String, Vec<f32>>,
    /// Number of cursors handed out and not yet closed.
    open_cursors: Cell<usize>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document made of (field, text) pairs and return its number.
    pub fn add_document<I, F, T>(&mut self, fields: I) -> DocId
    where
        I: IntoIterator<Item = (F, T)>,
        F: AsRef<str>,
        T: AsRef<str>,
    {
        let doc = self.deleted.len() as DocId;
        self.deleted.push(false);

        let mut lengths: AHashMap<String, i32> = AHashMap::new();
        for (field, text) in fields {
            let field = field.as_ref();
            let position = lengths.entry(field.to_string()).or_insert(0);
            for token in text.as_ref().split_whitespace() {
                let term = Term::new(field, token.to_lowercase());
                let postings = self.postings.entry(term).or_default();
                match postings.last_mut() {
                    Some(last) if last.doc == doc => last.positions.push(*position),
                    _ => postings.push(Posting {
                        doc,
                        positions: vec![*position],
                    }),
                }
                *position += 1;
            }
        }

        let similarity = DefaultSimilarity;
        for (field, length) in lengths {
            let norms = self.norms.entry(field.clone()).or_default();
            norms.resize(doc as usize, 1.0);
            norms.push(similarity.length_norm(&field, length));
        }

        doc
    }

    /// Mark a document as deleted.
    pub fn delete_document(&mut self, doc: DocId) -> Result<()> {
        if doc < 0 || doc as usize >= self.deleted.len() {
            return Err(SarissaError::invalid_argument(format!(
                "document {doc} is out of range (max_doc = {})",
                self.deleted.len()
            )));
        }
        self.deleted.set(doc as usize, true);
        Ok(())
    }

    /// Number of cursors opened on this index and not yet closed.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.get()
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    fn live_doc_freq(&self, postings: &[Posting]) -> i32 {
        postings.iter().filter(|p| !self.is_deleted(p.doc)).count() as i32
    }

    fn open(&self) -> CursorGuard<'_> {
        self.open_cursors.set(self.open_cursors.get() + 1);
        CursorGuard {
            counter: &self.open_cursors,
            open: true,
        }
    }
}

impl IndexReader for MemoryIndex {
    fn max_doc(&self) -> DocId {
        self.deleted.len() as DocId
    }

    fn num_docs(&self) -> i32 {
        self.deleted.iter().filter(|deleted| !deleted).count() as i32
    }

    fn is_deleted(&self, doc: DocId) -> bool {
        doc >= 0 && self.deleted.get(doc as usize).unwrap_or(false)
    }

    fn doc_freq(&self, term: &Term) -> Result<i32> {
        Ok(self
            .postings
            .get(term)
            .map(|postings| self.live_doc_freq(postings))
            .unwrap_or(0))
    }

    fn terms_from(&self, start: &Term) -> Result<Box<dyn TermEnum + '_>> {
        let mut terms = self.postings.range(start.clone()..);
        let current = terms.next();
        Ok(Box::new(MemoryTermEnum {
            index: self,
            terms,
            current,
            guard: self.open(),
        }))
    }

    fn term_docs(&self) -> Result<Box<dyn TermDocs + '_>> {
        Ok(Box::new(MemoryTermPositions::new(self)))
    }

    fn term_positions(&self) -> Result<Box<dyn TermPositions + '_>> {
        Ok(Box::new(MemoryTermPositions::new(self)))
    }

    fn norm(&self, field: &str, doc: DocId) -> f32 {
        self.norms
            .get(field)
            .and_then(|norms| norms.get(doc as usize))
            .copied()
            .unwrap_or(1.0)
    }
}

/// Tracks one open cursor; closing it twice is a no-op.
#[derive(Debug)]
struct CursorGuard<'a> {
    counter: &'a Cell<usize>,
    open: bool,
}

impl CursorGuard<'_> {
    fn release(&mut self) {
        if self.open {
            self.open = false;
            self.counter.set(self.counter.get().saturating_sub(1));
        }
    }
}

#[derive(Debug)]
struct MemoryTermEnum<'a> {
    index: &'a MemoryIndex,
    terms: btree_map::Range<'a, Term, Vec<Posting>>,
    current: Option<(&'a Term, &'a Vec<Posting>)>,
    guard: CursorGuard<'a>,
}

impl TermEnum for MemoryTermEnum<'_> {
    fn term(&self) -> Option<&Term> {
        self.current.map(|(term, _)| term)
    }

    fn doc_freq(&self) -> i32 {
        self.current
            .map(|(_, postings)| self.index.live_doc_freq(postings))
            .unwrap_or(0)
    }

    fn next(&mut self) -> Result<bool> {
        self.current = self.terms.next();
        Ok(self.current.is_some())
    }

    fn close(&mut self) -> Result<()> {
        self.guard.release();
        Ok(())
    }
}

/// Cursor over the postings of one term; serves both [`TermDocs`] and
/// [`TermPositions`].
#[derive(Debug)]
struct MemoryTermPositions<'a> {
    index: &'a MemoryIndex,
    postings: &'a [Posting],
    /// Index of the next posting to examine.
    next: usize,
    current: Option<&'a Posting>,
    doc: DocId,
    /// Positions of the current posting already returned.
    position_count: usize,
    guard: CursorGuard<'a>,
}

impl<'a> MemoryTermPositions<'a> {
    fn new(index: &'a MemoryIndex) -> Self {
        MemoryTermPositions {
            index,
            postings: &[],
            next: 0,
            current: None,
            doc: NO_DOC,
            position_count: 0,
            guard: index.open(),
        }
    }

    fn advance_from(&mut self, mut idx: usize) -> bool {
        while let Some(posting) = self.postings.get(idx) {
            idx += 1;
            if !self.index.is_deleted(posting.doc) {
                self.next = idx;
                self.current = Some(posting);
                self.doc = posting.doc;
                self.position_count = 0;
                return true;
            }
        }
        self.next = self.postings.len();
        self.current = None;
        self.doc = NO_MORE_DOCS;
        false
    }
}

impl TermDocs for MemoryTermPositions<'_> {
    fn seek(&mut self, term: &Term) -> Result<()> {
        self.postings = self
            .index
            .postings
            .get(term)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        self.next = 0;
        self.current = None;
        self.doc = NO_DOC;
        self.position_count = 0;
        Ok(())
    }

    fn doc(&self) -> DocId {
        self.doc
    }

    fn freq(&self) -> i32 {
        self.current.map(|p| p.positions.len() as i32).unwrap_or(0)
    }

    fn next(&mut self) -> Result<bool> {
        Ok(self.advance_from(self.next))
    }

    fn skip_to(&mut self, target: DocId) -> Result<bool> {
        let rest = &self.postings[self.next..];
        let offset = rest.partition_point(|p| p.doc < target);
        Ok(self.advance_from(self.next + offset))
    }

    fn close(&mut self) -> Result<()> {
        self.guard.release();
        Ok(())
    }
}

impl TermPositions for MemoryTermPositions<'_> {
    fn next_position(&mut self) -> Result<i32> {
        let posting = self
            .current
            .ok_or_else(|| SarissaError::index("next_position called on an unpositioned cursor"))?;
        let position = posting
            .positions
            .get(self.position_count)
            .copied()
            .ok_or_else(|| {
                SarissaError::index(format!(
                    "next_position called more than freq ({}) times for doc {}",
                    posting.positions.len(),
                    posting.doc
                ))
            })?;
        self.position_count += 1;
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        index.add_document([("body", "The quick brown fox")]);
        index.add_document([("body", "the lazy dog"), ("title", "Dogs")]);
        index.add_document([("body", "quick quick dog")]);
        index
    }

    #[test]
    fn test_document_numbering_and_deletion() {
        let mut index = sample_index();
        assert_eq!(index.max_doc(), 3);
        assert_eq!(index.num_docs(), 3);

        index.delete_document(1).unwrap();
        assert!(index.is_deleted(1));
        assert!(!index.is_deleted(0));
        assert_eq!(index.max_doc(), 3);
        assert_eq!(index.num_docs(), 2);
        assert!(index.delete_document(7).is_err());
    }

    #[test]
    fn test_term_docs_skip_deleted() {
        let mut index = sample_index();
        index.delete_document(1).unwrap();

        let mut docs = index.term_docs_for(&Term::new("body", "dog")).unwrap();
        assert_eq!(docs.doc(), NO_DOC);
        assert!(docs.next().unwrap());
        assert_eq!(docs.doc(), 2);
        assert_eq!(docs.freq(), 1);
        assert!(!docs.next().unwrap());
        assert_eq!(index.doc_freq(&Term::new("body", "dog")).unwrap(), 1);
    }

    #[test]
    fn test_positions() {
        let index = sample_index();
        let mut positions = index.term_positions_for(&Term::new("body", "quick")).unwrap();

        assert!(positions.next().unwrap());
        assert_eq!(positions.doc(), 0);
        assert_eq!(positions.next_position().unwrap(), 1);
        assert!(positions.next_position().is_err());

        assert!(positions.next().unwrap());
        assert_eq!(positions.doc(), 2);
        assert_eq!(positions.freq(), 2);
        assert_eq!(positions.next_position().unwrap(), 0);
        assert_eq!(positions.next_position().unwrap(), 1);
    }

    #[test]
    fn test_skip_to() {
        let index = sample_index();
        let mut docs = index.term_docs_for(&Term::new("body", "the")).unwrap();
        assert!(docs.skip_to(1).unwrap());
        assert_eq!(docs.doc(), 1);
        assert!(!docs.skip_to(2).unwrap());
        assert_eq!(docs.doc(), NO_MORE_DOCS);
    }

    #[test]
    fn test_terms_from_is_ordered() {
        let index = sample_index();
        let mut terms = index.terms_from(&Term::new("body", "l")).unwrap();

        let mut seen = Vec::new();
        while let Some(term) = terms.term() {
            seen.push(term.to_string());
            terms.next().unwrap();
        }
        assert_eq!(
            seen,
            vec!["body:lazy", "body:quick", "body:the", "title:dogs"]
        );
    }

    #[test]
    fn test_cursor_accounting() {
        let index = sample_index();
        let mut docs = index.term_docs().unwrap();
        let mut terms = index.terms_from(&Term::new("body", "")).unwrap();
        assert_eq!(index.open_cursors(), 2);

        docs.close().unwrap();
        docs.close().unwrap();
        terms.close().unwrap();
        assert_eq!(index.open_cursors(), 0);
    }

    #[test]
    fn test_length_norms() {
        let index = sample_index();
        assert_eq!(index.norm("body", 1), 1.0 / 3f32.sqrt());
        assert_eq!(index.norm("title", 1), 1.0);
        assert_eq!(index.norm("title", 0), 1.0);
    }

    #[test]
    fn test_terms_are_case_folded() {
        let index = sample_index();
        assert_eq!(index.doc_freq(&Term::new("body", "quick")).unwrap(), 2);
        assert_eq!(index.doc_freq(&Term::new("body", "Quick")).unwrap(), 0);
        assert_eq!(index.doc_freq(&Term::new("title", "dogs")).unwrap(), 1);
        assert_eq!(index.doc_freq(&Term::new("title", "Dogs")).unwrap(), 0);
    }
}
