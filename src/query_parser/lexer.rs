//! Hand-written lexer for the classic query syntax.
//!
//! The lexer turns a query string such as `title:"hello world"^2 AND ab*`
//! into a flat [`TokenList`]. It knows nothing about grammar: ranges and
//! quoted phrases are captured verbatim, delimiters included, and left for
//! the parser to pick apart.

use log::debug;

use crate::error::{LexicalError, Result};
use crate::query_parser::char_stream::CharStream;
use crate::query_parser::token::{Token, TokenKind, TokenList};

/// Characters that may follow a backslash inside a term.
pub const ESCAPABLE_CHARS: &str = "\\+-!():^[]{}\"~*";

/// Whether `c` ends a term. The delimiter itself is left in the stream.
fn is_term_delimiter(c: char) -> bool {
    c.is_whitespace()
        || matches!(
            c,
            '+' | '-' | '!' | '(' | ')' | ':' | '^' | '[' | ']' | '{' | '}' | '~' | '"'
        )
}

/// Produces tokens one at a time from a query string.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    stream: CharStream<'a>,
    failed: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over a query string.
    pub fn new(query: &'a str) -> Self {
        Lexer {
            stream: CharStream::new(query),
            failed: false,
        }
    }

    /// Tokenize the whole input, appending the terminal `EOF` token.
    ///
    /// The first lexical error aborts tokenization; no partial list is
    /// returned.
    pub fn lex(mut self) -> Result<TokenList> {
        let mut tokens = TokenList::new();
        while let Some(token) = self.next_token()? {
            tokens.add(token);
        }
        tokens.add(Token::eof());
        Ok(tokens)
    }

    /// Read the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.read_token().map_err(|e| {
            debug!("query lexing failed: {e}");
            self.failed = true;
            e.into()
        })
    }

    fn read_token(&mut self) -> std::result::Result<Option<Token>, LexicalError> {
        while let Some(c) = self.stream.advance() {
            if c.is_whitespace() {
                continue;
            }

            let kind = match c {
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ':' => TokenKind::Colon,
                '!' => TokenKind::Not,
                '^' => TokenKind::Carat,
                '~' => return Ok(Some(self.read_tilde())),
                '"' => return self.read_quoted().map(Some),
                '[' => return self.read_range('[', ']', TokenKind::RangeIn).map(Some),
                '{' => return self.read_range('{', '}', TokenKind::RangeEx).map(Some),
                ']' | '}' | '*' => {
                    return Err(LexicalError::UnrecognizedChar {
                        character: c,
                        position: self.stream.position(),
                    });
                }
                _ => return self.read_term(c).map(Some),
            };
            return Ok(Some(Token::new(kind, c.to_string())));
        }
        Ok(None)
    }

    /// `~` followed by digits is a slop, a bare `~` is a fuzzy marker.
    fn read_tilde(&mut self) -> Token {
        if !self.stream.peek().is_some_and(|c| c.is_ascii_digit()) {
            return Token::new(TokenKind::Fuzzy, "~");
        }

        let mut digits = String::new();
        while let Some(c) = self.stream.peek().filter(char::is_ascii_digit) {
            digits.push(c);
            self.stream.advance();
        }
        Token::new(TokenKind::Slop, digits)
    }

    fn read_quoted(&mut self) -> std::result::Result<Token, LexicalError> {
        let position = self.stream.position();
        let mut quoted = String::from('"');

        while let Some(c) = self.stream.advance() {
            quoted.push(c);
            match c {
                '"' => return Ok(Token::new(TokenKind::Quoted, quoted)),
                '\\' => {
                    if let Some(escaped) = self.stream.advance() {
                        quoted.push(escaped);
                    }
                }
                _ => {}
            }
        }
        Err(LexicalError::UnterminatedString { position })
    }

    fn read_range(
        &mut self,
        open: char,
        close: char,
        kind: TokenKind,
    ) -> std::result::Result<Token, LexicalError> {
        let position = self.stream.position();
        let mut range = String::from(open);

        while let Some(c) = self.stream.advance() {
            range.push(c);
            if c == close {
                return Ok(Token::new(kind, range));
            }
        }
        Err(LexicalError::UnterminatedRange {
            inclusive: kind == TokenKind::RangeIn,
            position,
        })
    }

    fn read_term(&mut self, first: char) -> std::result::Result<Token, LexicalError> {
        let mut text = String::new();
        let mut asterisks = 0usize;
        let mut has_question = false;
        let mut next = Some(first);

        while let Some(c) = next {
            match c {
                '\\' => {
                    let escaped = self.stream.advance();
                    match escaped {
                        Some(e) if ESCAPABLE_CHARS.contains(e) => {
                            text.push('\\');
                            text.push(e);
                        }
                        _ => {
                            return Err(LexicalError::UnrecognizedEscape {
                                character: escaped,
                                position: self.stream.position(),
                            });
                        }
                    }
                }
                '*' => {
                    asterisks += 1;
                    text.push(c);
                }
                '?' => {
                    has_question = true;
                    text.push(c);
                }
                _ => text.push(c),
            }

            next = match self.stream.peek() {
                Some(c) if !is_term_delimiter(c) => self.stream.advance(),
                _ => None,
            };
        }

        Ok(Token::new(classify_term(&text, asterisks, has_question), text))
    }
}

/// Decide the kind of an accumulated term.
fn classify_term(text: &str, asterisks: usize, has_question: bool) -> TokenKind {
    if has_question {
        TokenKind::WildTerm
    } else if asterisks == 1 && text.ends_with('*') {
        TokenKind::PrefixTerm
    } else if asterisks > 0 {
        TokenKind::WildTerm
    } else if text.eq_ignore_ascii_case("AND") || text == "&&" {
        TokenKind::And
    } else if text.eq_ignore_ascii_case("OR") || text == "||" {
        TokenKind::Or
    } else if text.eq_ignore_ascii_case("NOT") {
        TokenKind::Not
    } else if !text.chars().any(char::is_alphabetic) {
        TokenKind::Number
    } else {
        TokenKind::Term
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    /// Yields tokens until the input ends or an error is returned; the
    /// terminal `EOF` token is not part of this sequence.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.next_token().transpose()
    }
}

/// Tokenize a query string. Shorthand for `Lexer::new(query).lex()`.
pub fn tokenize(query: &str) -> Result<TokenList> {
    Lexer::new(query).lex()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Position, SarissaError};

    fn kinds(query: &str) -> Vec<TokenKind> {
        tokenize(query).unwrap().kinds()
    }

    fn lexical_error(query: &str) -> LexicalError {
        match tokenize(query) {
            Err(SarissaError::Lexical(e)) => e,
            other => panic!("expected a lexical error for {query:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_field_and_term() {
        let tokens: Vec<Token> = tokenize("foo:bar").unwrap().into_iter().collect();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Term, "foo"),
                Token::new(TokenKind::Colon, ":"),
                Token::new(TokenKind::Term, "bar"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_single_char_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds("+ - ( ) : ! ^"),
            vec![Plus, Minus, LParen, RParen, Colon, Not, Carat, Eof]
        );
    }

    #[test]
    fn test_whitespace_only_yields_eof() {
        assert_eq!(kinds(" \t\n "), vec![TokenKind::Eof]);
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_slop_and_fuzzy() {
        let tokens: Vec<Token> = tokenize("term~2 other~").unwrap().into_iter().collect();
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Term, "term"),
                Token::new(TokenKind::Slop, "2"),
                Token::new(TokenKind::Term, "other"),
                Token::new(TokenKind::Fuzzy, "~"),
                Token::eof(),
            ]
        );
    }

    #[test]
    fn test_multi_digit_slop() {
        let tokens = tokenize("\"a b\"~15").unwrap();
        assert_eq!(tokens.iter().nth(1).unwrap(), &Token::new(TokenKind::Slop, "15"));
    }

    #[test]
    fn test_quoted_phrase_is_kept_verbatim() {
        let tokens = tokenize("\"a b\"").unwrap();
        assert_eq!(tokens.peek(), Some(&Token::new(TokenKind::Quoted, "\"a b\"")));
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_escaped_quote_does_not_close_phrase() {
        let tokens = tokenize(r#""say \"hi\"""#).unwrap();
        assert_eq!(
            tokens.peek(),
            Some(&Token::new(TokenKind::Quoted, r#""say \"hi\"""#))
        );
    }

    #[test]
    fn test_ranges() {
        let tokens = tokenize("[a TO b] {c TO d}").unwrap();
        let tokens: Vec<Token> = tokens.into_iter().collect();
        assert_eq!(tokens[0], Token::new(TokenKind::RangeIn, "[a TO b]"));
        assert_eq!(tokens[1], Token::new(TokenKind::RangeEx, "{c TO d}"));
        assert_eq!(tokens[2], Token::eof());
    }

    #[test]
    fn test_term_classification() {
        use TokenKind::*;
        assert_eq!(kinds("te?t"), vec![WildTerm, Eof]);
        assert_eq!(kinds("test*"), vec![PrefixTerm, Eof]);
        assert_eq!(kinds("te*t"), vec![WildTerm, Eof]);
        assert_eq!(kinds("te*t*"), vec![WildTerm, Eof]);
        assert_eq!(kinds("?est*"), vec![WildTerm, Eof]);
        assert_eq!(kinds("and And && or OR || not"), vec![And, And, And, Or, Or, Or, Not, Eof]);
        assert_eq!(kinds("2024 3.14 12-"), vec![Number, Number, Number, Minus, Eof]);
        assert_eq!(kinds("abc a1"), vec![Term, Term, Eof]);
    }

    #[test]
    fn test_operators_end_terms() {
        use TokenKind::*;
        assert_eq!(
            kinds("a+b(c)d^2~e\"x\""),
            vec![Term, Plus, Term, LParen, Term, RParen, Term, Carat, Number, Fuzzy, Term, Quoted, Eof]
        );
    }

    #[test]
    fn test_escape_keeps_sequence_in_term() {
        let tokens = tokenize(r"fie\:ld:term").unwrap();
        let tokens: Vec<Token> = tokens.into_iter().collect();
        assert_eq!(tokens[0], Token::new(TokenKind::Term, r"fie\:ld"));
        assert_eq!(tokens[1].kind(), TokenKind::Colon);
        assert_eq!(tokens[2], Token::new(TokenKind::Term, "term"));
    }

    #[test]
    fn test_escaped_asterisk_is_not_a_wildcard() {
        let tokens = tokenize(r"ab\*").unwrap();
        assert_eq!(tokens.peek(), Some(&Token::new(TokenKind::Term, r"ab\*")));
    }

    #[test]
    fn test_unrecognized_escape() {
        let error = lexical_error(r"fie\ld");
        assert_eq!(
            error,
            LexicalError::UnrecognizedEscape {
                character: Some('l'),
                position: Position { line: 1, column: 5 },
            }
        );

        let error = lexical_error("abc\\");
        assert!(matches!(error, LexicalError::UnrecognizedEscape { character: None, .. }));
    }

    #[test]
    fn test_unterminated_quote() {
        let error = lexical_error("\"open");
        assert_eq!(
            error,
            LexicalError::UnterminatedString {
                position: Position { line: 1, column: 1 }
            }
        );
    }

    #[test]
    fn test_unterminated_ranges() {
        assert!(matches!(
            lexical_error("field:[a TO b"),
            LexicalError::UnterminatedRange { inclusive: true, .. }
        ));
        assert!(matches!(
            lexical_error("{a TO b"),
            LexicalError::UnterminatedRange { inclusive: false, .. }
        ));
    }

    #[test]
    fn test_illegal_leading_characters() {
        assert_eq!(
            lexical_error("]bad"),
            LexicalError::UnrecognizedChar {
                character: ']',
                position: Position { line: 1, column: 1 },
            }
        );
        assert!(matches!(
            lexical_error("ok }"),
            LexicalError::UnrecognizedChar { character: '}', .. }
        ));
        assert!(matches!(
            lexical_error("*foo"),
            LexicalError::UnrecognizedChar { character: '*', .. }
        ));
    }

    #[test]
    fn test_bracket_inside_term_is_a_delimiter() {
        // `bad` is read as a term; the `]` that ends it then fails on its own.
        let mut lexer = Lexer::new("bad]");
        assert_eq!(
            lexer.next_token().unwrap(),
            Some(Token::new(TokenKind::Term, "bad"))
        );
        assert!(matches!(
            lexer.next_token(),
            Err(SarissaError::Lexical(LexicalError::UnrecognizedChar { character: ']', .. }))
        ));
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let mut lexer = Lexer::new("a \"b");
        assert!(lexer.next().unwrap().is_ok());
        assert!(lexer.next().unwrap().is_err());
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_iterator_has_no_eof_token() {
        let tokens: Vec<Token> = Lexer::new("a b").collect::<Result<_>>().unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_positions_on_later_lines() {
        let error = lexical_error("a\n  ]");
        assert_eq!(error.position(), Position { line: 2, column: 3 });
    }
}
