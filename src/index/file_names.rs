//! Recognition of the file names an index directory may contain.

use ahash::AHashSet;
use lazy_static::lazy_static;

/// Extensions of every file that belongs to an index.
pub const INDEX_EXTENSIONS: &[&str] = &[
    "cfs", "fnm", "fdx", "fdt", "tii", "tis", "frq", "prx", "del", "tvx", "tvd", "tvf", "gen",
    "nrm", "cfx",
];

/// Extensions of the files that may be packed into a compound file.
pub const COMPOUND_FILE_EXTENSIONS: &[&str] = &[
    "fnm", "fdx", "fdt", "tii", "tis", "frq", "prx", "tvx", "tvd", "tvf", "nrm",
];

/// Name of the legacy list of deletable files.
pub const DELETABLE: &str = "deletable";

/// Prefix of the segments file (and of its generations).
pub const SEGMENTS: &str = "segments";

lazy_static! {
    static ref GLOBAL_FILTER: IndexFileNameFilter = IndexFileNameFilter::new();
}

/// Accepts the names of files written by the index.
#[derive(Debug, Clone)]
pub struct IndexFileNameFilter {
    extensions: AHashSet<&'static str>,
    compound_extensions: AHashSet<&'static str>,
}

impl Default for IndexFileNameFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexFileNameFilter {
    /// Build a filter over the standard extension sets.
    pub fn new() -> Self {
        IndexFileNameFilter {
            extensions: INDEX_EXTENSIONS.iter().copied().collect(),
            compound_extensions: COMPOUND_FILE_EXTENSIONS.iter().copied().collect(),
        }
    }

    /// The process-wide filter, built on first use.
    pub fn global() -> &'static IndexFileNameFilter {
        &GLOBAL_FILTER
    }

    /// Whether `name` is an index file.
    pub fn accept(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((_, extension)) => {
                self.extensions.contains(extension)
                    || is_numbered(extension, 'f')
                    || is_numbered(extension, 's')
            }
            None => name == DELETABLE || name.starts_with(SEGMENTS),
        }
    }

    /// Whether `name` is a file that may live inside a compound file.
    pub fn is_cfs_file(&self, name: &str) -> bool {
        match name.rsplit_once('.') {
            Some((_, extension)) => {
                self.compound_extensions.contains(extension) || is_numbered(extension, 'f')
            }
            None => false,
        }
    }
}

/// Separate norm files are named `<segment>.f<n>` or `<segment>.s<n>`.
fn is_numbered(extension: &str, prefix: char) -> bool {
    extension
        .strip_prefix(prefix)
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}
