//! Parse error types.

use thiserror::Error;

use crate::lexer::Token;

/// Parse error with a 1-based source position.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    /// Category of the failure.
    pub kind: ParseErrorKind,
    /// 1-based line.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Human-readable description.
    pub message: String,
}

/// Category of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Bytes that match no token.
    InvalidToken,
    /// A token other than the one the grammar requires.
    UnexpectedToken,
    /// Input ended inside a construct.
    UnexpectedEof,
    /// Well-tokenized but ill-formed, e.g. a repeated field modifier.
    InvalidSyntax,
}

impl ParseError {
    fn at(source: &str, offset: usize, kind: ParseErrorKind, message: String) -> Self {
        let (line, column) = line_col(source, offset);
        Self {
            kind,
            line,
            column,
            message,
        }
    }

    /// Bytes at `offset` are not a token.
    pub fn invalid_token(source: &str, offset: usize, snippet: &str) -> Self {
        Self::at(
            source,
            offset,
            ParseErrorKind::InvalidToken,
            format!("invalid token {snippet:?}"),
        )
    }

    /// Found `found` (or end of input) where `expected` was required.
    pub fn expected(source: &str, offset: usize, expected: &str, found: Option<&Token>) -> Self {
        match found {
            Some(token) => Self::at(
                source,
                offset,
                ParseErrorKind::UnexpectedToken,
                format!("expected {expected}, found {token}"),
            ),
            None => Self::at(
                source,
                offset,
                ParseErrorKind::UnexpectedEof,
                format!("expected {expected}, found end of input"),
            ),
        }
    }

    /// Structurally invalid input.
    pub fn invalid_syntax(source: &str, offset: usize, message: impl Into<String>) -> Self {
        Self::at(source, offset, ParseErrorKind::InvalidSyntax, message.into())
    }
}

/// Convert a byte offset into a 1-based (line, column) pair.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_first_line() {
        assert_eq!(line_col("abc", 0), (1, 1));
        assert_eq!(line_col("abc", 2), (1, 3));
    }

    #[test]
    fn test_line_col_after_newlines() {
        assert_eq!(line_col("a\nbc\nd", 5), (3, 1));
        assert_eq!(line_col("a\nbc\nd", 3), (2, 2));
    }

    #[test]
    fn test_line_col_past_end_clamped() {
        assert_eq!(line_col("ab", 99), (1, 3));
    }

    #[test]
    fn test_display() {
        let e = ParseError::expected("x", 0, "'{'", Some(&Token::Comma));
        assert_eq!(e.to_string(), "expected '{', found ',' at line 1, column 1");
        assert_eq!(e.kind, ParseErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_eof_kind() {
        let e = ParseError::expected("x", 1, "identifier", None);
        assert_eq!(e.kind, ParseErrorKind::UnexpectedEof);
    }
}
