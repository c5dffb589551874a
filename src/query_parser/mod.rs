//! Lexical analysis of query strings.
//!
//! The grammar-level parser lives outside this crate; it consumes the
//! [`TokenList`] produced here.

pub mod char_stream;
pub mod lexer;
pub mod token;

pub use char_stream::CharStream;
pub use lexer::{Lexer, tokenize};
pub use token::{Token, TokenKind, TokenList};
