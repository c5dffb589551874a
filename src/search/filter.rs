//! Document filters.

use std::fmt::Debug;

use bit_vec::BitVec;

use crate::error::Result;
use crate::index::IndexReader;

/// Restricts a search to a set of documents.
pub trait Filter: Debug {
    /// One bit per document of `reader` (`max_doc` bits, default false); set
    /// bits are permitted in results.
    fn bits(&self, reader: &dyn IndexReader) -> Result<BitVec>;
}
