//! Token stream wrapper for the hand-written parser.

use super::ParseError;
use crate::lexer::{SpannedToken, Token};

/// Token stream with lookahead and source positions.
///
/// Keywords are contextual, so most checks compare an identifier's text
/// rather than a token discriminant.
pub struct TokenStream<'src> {
    source: &'src str,
    tokens: &'src [SpannedToken],
    pos: usize,
}

impl<'src> TokenStream<'src> {
    /// Create a new token stream over `tokens` lexed from `source`.
    pub fn new(source: &'src str, tokens: &'src [SpannedToken]) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    /// Peek at the current token without consuming it.
    pub fn peek(&self) -> Option<&'src Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Peek at the nth token ahead without consuming.
    pub fn peek_nth(&self, n: usize) -> Option<&'src Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    /// Advance to the next token and return the current one.
    pub fn advance(&mut self) -> Option<&'src Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Whether the current token has the same discriminant as `expected`.
    pub fn check(&self, expected: &Token) -> bool {
        matches!(self.peek(), Some(t) if std::mem::discriminant(t) == std::mem::discriminant(expected))
    }

    /// Whether the current token is the identifier `keyword`.
    pub fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(s)) if s == keyword)
    }

    /// Consume the current token if it matches `expected`.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume the identifier `keyword` if it is next.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Expect a specific punctuation token.
    pub fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.eat(&expected) {
            Ok(())
        } else {
            Err(self.error_expected(&expected.to_string()))
        }
    }

    /// Expect the identifier `keyword`.
    pub fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.error_expected(&format!("'{keyword}'")))
        }
    }

    /// Expect any identifier and return its text.
    pub fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.error_expected(what)),
        }
    }

    /// Consume a `[]` array marker if present.
    pub fn eat_array_marker(&mut self) -> bool {
        if self.check(&Token::LBracket) && matches!(self.peek_nth(1), Some(Token::RBracket)) {
            self.pos += 2;
            true
        } else {
            false
        }
    }

    /// Check if we've reached the end of the token stream.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Byte offset of the current token, or the end of the source.
    pub fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| t.span.start)
    }

    /// "expected X, found Y" at the current token.
    pub fn error_expected(&self, what: &str) -> ParseError {
        ParseError::expected(self.source, self.offset(), what, self.peek())
    }

    /// Structural error at the token before the cursor.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .pos
            .checked_sub(1)
            .and_then(|p| self.tokens.get(p))
            .map_or(self.offset(), |t| t.span.start);
        ParseError::invalid_syntax(self.source, offset, message)
    }
}
