//! Tokens produced by the query lexer.

use std::collections::VecDeque;
use std::collections::vec_deque;
use std::fmt;

use serde::Serialize;

/// The lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// A plain word.
    Term,
    /// A word made only of non-alphabetic characters.
    Number,
    /// A word with `?`, or with `*` anywhere but a single trailing position.
    WildTerm,
    /// A word whose only wildcard is one trailing `*`.
    PrefixTerm,
    /// A double-quoted phrase, quotes included.
    Quoted,
    /// An inclusive range `[..]`, brackets included.
    RangeIn,
    /// An exclusive range `{..}`, braces included.
    RangeEx,
    And,
    Or,
    Not,
    Plus,
    Minus,
    LParen,
    RParen,
    Colon,
    Carat,
    /// A lone `~`.
    Fuzzy,
    /// `~` followed by digits; the token text holds the digits.
    Slop,
    /// End of input. Only ever produced as the last token of a list.
    Eof,
}

impl TokenKind {
    /// Name used in diagnostics and human-readable output.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Term => "TERM",
            TokenKind::Number => "NUMBER",
            TokenKind::WildTerm => "WILDTERM",
            TokenKind::PrefixTerm => "PREFIXTERM",
            TokenKind::Quoted => "QUOTED",
            TokenKind::RangeIn => "RANGEIN",
            TokenKind::RangeEx => "RANGEEX",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Colon => "COLON",
            TokenKind::Carat => "CARAT",
            TokenKind::Fuzzy => "FUZZY",
            TokenKind::Slop => "SLOP",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One lexical unit of a query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    /// Create a token.
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Self {
        Token {
            kind,
            text: text.into(),
        }
    }

    /// The end-of-input token.
    pub fn eof() -> Self {
        Token::new(TokenKind::Eof, "")
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}({})", self.kind, self.text)
        }
    }
}

/// An ordered token sequence, consumed front to back by a query parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenList {
    tokens: VecDeque<Token>,
}

impl TokenList {
    /// Create an empty list.
    pub fn new() -> Self {
        TokenList {
            tokens: VecDeque::new(),
        }
    }

    /// Append a token at the end.
    pub fn add(&mut self, token: Token) {
        self.tokens.push_back(token);
    }

    /// Put a token back at the front, so the next `extract` returns it.
    pub fn push(&mut self, token: Token) {
        self.tokens.push_front(token);
    }

    /// The next token without removing it.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// Remove and return the next token.
    pub fn extract(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// The kinds of all tokens, in order.
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(Token::kind).collect()
    }
}

impl IntoIterator for TokenList {
    type Item = Token;
    type IntoIter = vec_deque::IntoIter<Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.into_iter()
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = vec_deque::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

impl fmt::Display for TokenList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display() {
        assert_eq!(Token::new(TokenKind::Term, "foo").to_string(), "TERM(foo)");
        assert_eq!(Token::eof().to_string(), "EOF");
    }

    #[test]
    fn test_token_list_queue_operations() {
        let mut list = TokenList::new();
        list.add(Token::new(TokenKind::Term, "a"));
        list.add(Token::new(TokenKind::Colon, ":"));
        assert_eq!(list.len(), 2);
        assert_eq!(list.peek().map(Token::kind), Some(TokenKind::Term));

        let first = list.extract().unwrap();
        assert_eq!(first.text(), "a");
        assert_eq!(list.len(), 1);

        list.push(first);
        assert_eq!(list.kinds(), vec![TokenKind::Term, TokenKind::Colon]);
    }

    #[test]
    fn test_token_kind_serializes_by_name() {
        let json = serde_json::to_string(&Token::new(TokenKind::PrefixTerm, "ab*")).unwrap();
        assert_eq!(json, r#"{"kind":"PREFIX_TERM","text":"ab*"}"#);
    }
}
