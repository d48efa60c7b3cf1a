//! Hand-written recursive descent parser for the CTO schema language.
//!
//! ## Architecture
//!
//! - `stream`: TokenStream wrapper with lookahead and source offsets
//! - `error`: ParseError with line/column positions
//! - `decl`: model, import, declaration and member parsers
//!
//! The parser stops at the first error; it never panics on malformed input.

mod decl;
mod error;
mod stream;

pub use error::{ParseError, ParseErrorKind};
use stream::TokenStream;

use crate::ast::ModelFile;
use crate::lexer;

/// Parse a complete source file.
///
/// # Errors
///
/// Returns the first lexical or grammatical error encountered.
pub fn parse(source: &str) -> Result<ModelFile, ParseError> {
    let tokens = lexer::tokenize(source)?;
    let mut stream = TokenStream::new(source, &tokens);
    let file = decl::parse_model(&mut stream)?;
    tracing::trace!(
        namespace = %file.namespace,
        declarations = file.body.len(),
        "parsed model file"
    );
    Ok(file)
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Arbitrary input produces a tree or an error, never a panic.
        #[test]
        fn parse_never_panics(src in "\\PC{0,200}") {
            let _ = parse(&src);
        }

        /// Arbitrary text after a valid header still yields a positioned error or a tree.
        #[test]
        fn error_positions_within_source(body in "[a-z{}()@o\\[\\]=,. \n\"/*-]{0,80}") {
            let src = format!("namespace a.b\n{body}");
            if let Err(e) = parse(&src) {
                prop_assert!(e.line >= 1 && e.line <= src.lines().count().max(1) + 1);
                prop_assert!(e.column >= 1);
            }
        }
    }
}
