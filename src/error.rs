//! Error types for the Sarissa query core.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`SarissaError`] enum. Lexical failures carry a structured
//! [`LexicalError`] so a query parser can report the offending character
//! and where it was found.
//!
//! # Examples
//!
//! ```
//! use sarissa_query::error::{Result, SarissaError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(SarissaError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::fmt;
use std::io;

use serde::Serialize;
use thiserror::Error;

/// A 1-based line/column location inside a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Renders a character the way lexer diagnostics report it: its code point
/// followed by the glyph.
fn describe_char(c: &char) -> String {
    format!("U+{:04X} '{}'", *c as u32, c.escape_debug())
}

fn range_kind(inclusive: &bool) -> &'static str {
    if *inclusive { "inclusive" } else { "exclusive" }
}

fn describe_escape(c: &Option<char>) -> String {
    match c {
        Some(c) => describe_char(c),
        None => "end of input".to_string(),
    }
}

/// Failures raised while turning a query string into tokens.
///
/// Every lexical error is fatal to the tokenization in progress.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexicalError {
    /// A `"` was opened but the input ended before it was closed.
    #[error("Unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    /// A `[` or `{` was opened but the input ended before it was closed.
    #[error("Unterminated {} range starting at {position}", range_kind(.inclusive))]
    UnterminatedRange { inclusive: bool, position: Position },

    /// A character that cannot begin a token.
    #[error("Unrecognized char {} at {position}", describe_char(.character))]
    UnrecognizedChar { character: char, position: Position },

    /// A backslash followed by a character outside the reserved operator set.
    #[error("Unrecognized escape sequence {} at {position}", describe_escape(.character))]
    UnrecognizedEscape {
        character: Option<char>,
        position: Position,
    },
}

impl LexicalError {
    /// Where in the input the error was detected.
    pub fn position(&self) -> Position {
        match self {
            LexicalError::UnterminatedString { position }
            | LexicalError::UnterminatedRange { position, .. }
            | LexicalError::UnrecognizedChar { position, .. }
            | LexicalError::UnrecognizedEscape { position, .. } => *position,
        }
    }
}

/// The main error type for Sarissa query operations.
#[derive(Error, Debug)]
pub enum SarissaError {
    /// I/O errors (reading documents, configuration, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Lexical errors raised while tokenizing a query string.
    #[error("Lexical error: {0}")]
    Lexical(#[from] LexicalError),

    /// Index-related errors reported by a reader.
    #[error("Index error: {0}")]
    Index(String),

    /// Query-related errors (invalid construction, bad rewrite state, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// A rewritten query expanded into more clauses than allowed.
    #[error("Too many clauses: {count} exceeds the maximum of {max}")]
    TooManyClauses { count: usize, max: usize },

    /// The operation is not supported for this query in its current form.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with SarissaError.
pub type Result<T> = std::result::Result<T, SarissaError>;

impl SarissaError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        SarissaError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        SarissaError::Query(msg.into())
    }

    /// Create a new unsupported-operation error.
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        SarissaError::Unsupported(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SarissaError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SarissaError::Other(msg.into())
    }

    /// Returns the lexical error if this is one.
    pub fn as_lexical(&self) -> Option<&LexicalError> {
        match self {
            SarissaError::Lexical(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = SarissaError::index("Test index error");
        assert_eq!(error.to_string(), "Index error: Test index error");

        let error = SarissaError::query("bad clause");
        assert_eq!(error.to_string(), "Query error: bad clause");

        let error = SarissaError::TooManyClauses { count: 2000, max: 1024 };
        assert_eq!(
            error.to_string(),
            "Too many clauses: 2000 exceeds the maximum of 1024"
        );
    }

    #[test]
    fn test_lexical_error_message_includes_code_and_position() {
        let error = LexicalError::UnrecognizedChar {
            character: ']',
            position: Position { line: 1, column: 4 },
        };
        assert_eq!(error.to_string(), "Unrecognized char U+005D ']' at 1:4");
        assert_eq!(error.position(), Position { line: 1, column: 4 });

        let error = LexicalError::UnrecognizedEscape {
            character: None,
            position: Position { line: 2, column: 1 },
        };
        assert_eq!(
            error.to_string(),
            "Unrecognized escape sequence end of input at 2:1"
        );
    }

    #[test]
    fn test_lexical_error_conversion() {
        let lexical = LexicalError::UnterminatedRange {
            inclusive: true,
            position: Position { line: 1, column: 1 },
        };
        let error = SarissaError::from(lexical.clone());

        assert_eq!(error.as_lexical(), Some(&lexical));
        assert_eq!(
            error.to_string(),
            "Lexical error: Unterminated inclusive range starting at 1:1"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = SarissaError::from(io_error);

        match error {
            SarissaError::Io(_) => {}
            _ => panic!("Expected IO error variant"),
        }
    }
}
