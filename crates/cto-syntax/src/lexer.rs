//! Lexical analysis for the CTO schema language.
//!
//! Tokenization is done with `logos`. Whitespace and both comment styles
//! are skipped. There are no reserved words: `namespace`, `concept`, `o`,
//! `optional`, `true` and friends are all lexed as [`Token::Ident`] and
//! recognized contextually by the parser, so they remain legal as names.

use logos::Logos;
use serde::Serialize;
use std::ops::Range;

use crate::parser::ParseError;

/// CTO token.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
pub enum Token {
    /// Delimiter `{`
    #[token("{")]
    LBrace,
    /// Delimiter `}`
    #[token("}")]
    RBrace,
    /// Delimiter `[`
    #[token("[")]
    LBracket,
    /// Delimiter `]`
    #[token("]")]
    RBracket,
    /// Delimiter `(`
    #[token("(")]
    LParen,
    /// Delimiter `)`
    #[token(")")]
    RParen,
    /// `,`
    #[token(",")]
    Comma,
    /// `.`
    #[token(".")]
    Dot,
    /// `=`
    #[token("=")]
    Eq,
    /// Decorator marker `@`
    #[token("@")]
    At,
    /// Wildcard import `*`
    #[token("*")]
    Star,
    /// Relationship marker `-->`
    #[token("-->")]
    Arrow,

    /// Numeric literal, kept as written so the lowering pass can parse it
    /// for the declared field kind.
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().to_string())]
    Number(String),

    /// String literal with escapes resolved.
    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| unescape_string(lex.slice()))]
    Str(String),

    /// Regex literal `/pattern/flags`.
    #[regex(r"/([^/*\n\\]|\\.)([^/\n\\]|\\.)*/[a-zA-Z]*", |lex| RegexParts::split(lex.slice()))]
    Regex(RegexParts),

    /// Absolute URI following `from` in an import.
    #[regex(r"[a-zA-Z][a-zA-Z0-9]*://[^ \t\r\n]+", |lex| lex.slice().to_string())]
    Uri(String),

    /// Identifier or contextual keyword.
    #[regex(r"[\p{L}$_][\p{L}\p{N}$_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

/// The body and flags of a `/pattern/flags` literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegexParts {
    /// Text between the delimiters, escapes untouched.
    pub pattern: String,
    /// Trailing flag letters, possibly empty.
    pub flags: String,
}

impl RegexParts {
    fn split(slice: &str) -> Option<Self> {
        let body = slice.strip_prefix('/')?;
        let close = body.rfind('/')?;
        Some(Self {
            pattern: body[..close].to_string(),
            flags: body[close + 1..].to_string(),
        })
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LBrace => f.write_str("'{'"),
            Token::RBrace => f.write_str("'}'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
            Token::Dot => f.write_str("'.'"),
            Token::Eq => f.write_str("'='"),
            Token::At => f.write_str("'@'"),
            Token::Star => f.write_str("'*'"),
            Token::Arrow => f.write_str("'-->'"),
            Token::Number(n) => write!(f, "number {n}"),
            Token::Str(s) => write!(f, "string {s:?}"),
            Token::Regex(r) => write!(f, "regex /{}/{}", r.pattern, r.flags),
            Token::Uri(u) => write!(f, "uri {u}"),
            Token::Ident(i) => write!(f, "'{i}'"),
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    /// The token.
    pub token: Token,
    /// Byte offsets into the source text.
    pub span: Range<usize>,
}

/// Tokenize a whole source file.
///
/// # Errors
///
/// Returns `ParseError` of kind `InvalidToken` at the first byte sequence
/// that matches no token.
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>, ParseError> {
    let mut out = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => out.push(SpannedToken { token, span }),
            Err(()) => {
                let snippet: String = source
                    .get(span.clone())
                    .unwrap_or_default()
                    .chars()
                    .take(16)
                    .collect();
                return Err(ParseError::invalid_token(source, span.start, &snippet));
            }
        }
    }
    Ok(out)
}

/// Strip quotes from a string literal and resolve `\" \\ \n \r \t` escapes.
///
/// Any other escaped character stands for itself.
fn unescape_string(slice: &str) -> Option<String> {
    let inner = slice.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            other => out.push(other),
        }
    }
    Some(out)
}

/// Inverse of the literal unescaping: render `value` as a quoted literal.
pub fn escape_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Token> {
        tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn test_keywords_are_identifiers() {
        assert_eq!(
            lex("namespace concept o optional"),
            vec![ident("namespace"), ident("concept"), ident("o"), ident("optional")]
        );
    }

    #[test]
    fn test_dotted_path() {
        assert_eq!(
            lex("org.acme.*"),
            vec![ident("org"), Token::Dot, ident("acme"), Token::Dot, Token::Star]
        );
    }

    #[test]
    fn test_comments_skipped() {
        let src = "/**\n * The model\n */\nconcept // trailing\nFoo /* inline */ {}";
        assert_eq!(
            lex(src),
            vec![ident("concept"), ident("Foo"), Token::LBrace, Token::RBrace]
        );
    }

    #[test]
    fn test_single_line_block_comment() {
        assert_eq!(lex("/* c */ x"), vec![ident("x")]);
        assert_eq!(lex("a/**/b"), vec![ident("a"), ident("b")]);
    }

    #[test]
    fn test_doc_comment_before_namespace() {
        let src = "/*\n * Licensed under the Apache License.\n *\n */\n\n/** Doc. */\nnamespace ns.a";
        assert_eq!(
            lex(src),
            vec![ident("namespace"), ident("ns"), Token::Dot, ident("a")]
        );
    }

    #[test]
    fn test_arrow_and_negative_number() {
        assert_eq!(
            lex("--> -1.5 2e3"),
            vec![
                Token::Arrow,
                Token::Number("-1.5".into()),
                Token::Number("2e3".into())
            ]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            lex(r#""a\"b\\c\nd""#),
            vec![Token::Str("a\"b\\c\nd".into())]
        );
    }

    #[test]
    fn test_escape_inverts_unescape() {
        let original = "tab\there \"quoted\" back\\slash\r\n";
        let literal = escape_string(original);
        assert_eq!(lex(&literal), vec![Token::Str(original.into())]);
    }

    #[test]
    fn test_regex_literal() {
        assert_eq!(
            lex(r"regex=/^[A-Z]\/x$/iu"),
            vec![
                ident("regex"),
                Token::Eq,
                Token::Regex(RegexParts {
                    pattern: r"^[A-Z]\/x$".into(),
                    flags: "iu".into()
                })
            ]
        );
    }

    #[test]
    fn test_regex_without_flags() {
        assert_eq!(
            lex("/abc/"),
            vec![Token::Regex(RegexParts {
                pattern: "abc".into(),
                flags: String::new()
            })]
        );
    }

    #[test]
    fn test_uri() {
        assert_eq!(
            lex("from https://models.example.com/hr.cto"),
            vec![ident("from"), Token::Uri("https://models.example.com/hr.cto".into())]
        );
    }

    #[test]
    fn test_identifier_charset() {
        assert_eq!(
            lex("$identifier _x caf\u{e9}1"),
            vec![ident("$identifier"), ident("_x"), ident("caf\u{e9}1")]
        );
    }

    #[test]
    fn test_invalid_token_position() {
        let err = tokenize("namespace a\n  #").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
    }
}
