//! String regex validators.
//!
//! Schema regexes are written as `/pattern/flags` literals. They are compiled
//! with the `regex` crate, which has no look-around. The one look-around
//! form schemas rely on, a leading negative look-ahead over literal
//! alternatives (`^(?!null|true|false)…`), is turned into an explicit
//! excluded-prefix check before the remainder is compiled.

use regex::Regex;
use thiserror::Error;

/// A regex literal that could not be compiled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The text is not of the form `/pattern/flags`.
    #[error("not a regex literal: {0:?}")]
    NotALiteral(String),
    /// A flag letter other than `i`, `m`, `s`, `u`, `g`, `y`.
    #[error("unsupported regex flag '{0}'")]
    UnsupportedFlag(char),
    /// The `regex` crate rejected the pattern.
    #[error("invalid regex: {0}")]
    Invalid(String),
}

/// A compiled string validator.
#[derive(Debug, Clone)]
pub struct Pattern {
    excluded_prefixes: Vec<String>,
    regex: Regex,
}

impl Pattern {
    /// Compile a `/pattern/flags` literal.
    pub fn from_literal(literal: &str) -> Result<Self, PatternError> {
        let not_literal = || PatternError::NotALiteral(literal.to_string());
        let body = literal.strip_prefix('/').ok_or_else(not_literal)?;
        let close = body.rfind('/').ok_or_else(not_literal)?;
        Self::compile(&body[..close], &body[close + 1..])
    }

    /// Compile a pattern body with its flag letters.
    pub fn compile(pattern: &str, flags: &str) -> Result<Self, PatternError> {
        let mut inline = String::new();
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' => inline.push(flag),
                // Unicode is always on; global and sticky do not affect matching.
                'u' | 'g' | 'y' => {}
                other => return Err(PatternError::UnsupportedFlag(other)),
            }
        }

        let (excluded_prefixes, rest) = split_leading_exclusion(pattern);
        let source = if inline.is_empty() {
            rest
        } else {
            format!("(?{inline}){rest}")
        };
        let regex = Regex::new(&source).map_err(|e| PatternError::Invalid(e.to_string()))?;
        Ok(Self {
            excluded_prefixes,
            regex,
        })
    }

    /// Test a value the way a schema regex validator does (search, not full match).
    pub fn is_match(&self, value: &str) -> bool {
        !self
            .excluded_prefixes
            .iter()
            .any(|p| value.starts_with(p.as_str()))
            && self.regex.is_match(value)
    }
}

/// `^(?!a|b)rest` → (["a", "b"], "^rest"). Anything else is returned as is.
fn split_leading_exclusion(pattern: &str) -> (Vec<String>, String) {
    let Some(after) = pattern.strip_prefix("^(?!") else {
        return (Vec::new(), pattern.to_string());
    };
    let Some(close) = after.find(')') else {
        return (Vec::new(), pattern.to_string());
    };
    let alternatives = &after[..close];
    let literal = alternatives
        .chars()
        .all(|c| c == '|' || c.is_alphanumeric() || c == '_');
    if !literal {
        return (Vec::new(), pattern.to_string());
    }
    let prefixes = alternatives
        .split('|')
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    (prefixes, format!("^{}", &after[close + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDENTIFIER: &str = r"^(?!null|true|false)(\p{Lu}|\p{Ll}|\p{Lt}|\p{Lm}|\p{Lo}|\p{Nl}|\$|_|\\u[0-9A-Fa-f]{4})(?:\p{Lu}|\p{Ll}|\p{Lt}|\p{Lm}|\p{Lo}|\p{Nl}|\$|_|\\u[0-9A-Fa-f]{4}|\p{Mn}|\p{Mc}|\p{Nd}|\p{Pc}|\u200C|\u200D)*$";

    #[test]
    fn test_identifier_rule_accepts_names() {
        let p = Pattern::compile(IDENTIFIER, "u").unwrap();
        for ok in ["Person", "firstName", "_x", "$class", "caf\u{e9}", "x1"] {
            assert!(p.is_match(ok), "{ok} should match");
        }
    }

    #[test]
    fn test_identifier_rule_rejects() {
        let p = Pattern::compile(IDENTIFIER, "u").unwrap();
        for bad in ["", "1x", "null", "true", "falsey", "a-b", "a b"] {
            assert!(!p.is_match(bad), "{bad:?} should not match");
        }
    }

    #[test]
    fn test_from_literal_with_flags() {
        let p = Pattern::from_literal("/^abc$/i").unwrap();
        assert!(p.is_match("ABC"));
        assert!(!p.is_match("abcd"));
    }

    #[test]
    fn test_search_semantics() {
        let p = Pattern::from_literal("/b/").unwrap();
        assert!(p.is_match("abc"));
    }

    #[test]
    fn test_unsupported_flag() {
        assert_eq!(
            Pattern::compile("a", "x").unwrap_err(),
            PatternError::UnsupportedFlag('x')
        );
    }

    #[test]
    fn test_inner_lookaround_rejected() {
        assert!(matches!(
            Pattern::compile("a(?=b)", ""),
            Err(PatternError::Invalid(_))
        ));
    }

    #[test]
    fn test_not_a_literal() {
        assert!(matches!(
            Pattern::from_literal("abc"),
            Err(PatternError::NotALiteral(_))
        ));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn identifier_rule_excludes_literal_prefixes(name in "[a-zA-Z_$][a-zA-Z0-9_$]{0,12}") {
                let p = Pattern::compile(IDENTIFIER, "u").unwrap();
                let reserved = ["null", "true", "false"].iter().any(|k| name.starts_with(k));
                prop_assert_eq!(p.is_match(&name), !reserved);
            }

            #[test]
            fn identifier_rule_rejects_leading_digit(name in "[0-9][a-zA-Z0-9_]{0,8}") {
                let p = Pattern::compile(IDENTIFIER, "u").unwrap();
                prop_assert!(!p.is_match(&name));
            }
        }
    }
}
