//! Character source for the query lexer.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::Position;

/// A forward-only character stream with one character of lookahead.
///
/// The lexer decides whether a character ends the current token by peeking
/// at it, so nothing ever has to be pushed back into the stream.
#[derive(Debug, Clone)]
pub struct CharStream<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> CharStream<'a> {
    /// Create a stream over a query string.
    pub fn new(input: &'a str) -> Self {
        CharStream {
            chars: input.chars().peekable(),
            line: 1,
            column: 0,
        }
    }

    /// Look at the next character without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consume and return the next character.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Whether every character has been consumed.
    pub fn at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Line of the most recently consumed character (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column of the most recently consumed character (1-based, 0 before
    /// anything on the line was consumed).
    pub fn column(&self) -> usize {
        self.column
    }

    /// Position of the most recently consumed character.
    pub fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }
}
