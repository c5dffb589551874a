//! Index-side collaborators: terms, reader traits and an in-memory index.

pub mod file_names;
pub mod memory;
pub mod reader;

pub use file_names::IndexFileNameFilter;
pub use memory::MemoryIndex;
pub use reader::{IndexReader, Term, TermDocs, TermEnum, TermPositions};

/// A document number.
pub type DocId = i32;

/// Sentinel of an iterator that has not been advanced yet.
pub const NO_DOC: DocId = -1;

/// Sentinel of an exhausted iterator.
pub const NO_MORE_DOCS: DocId = DocId::MAX;
