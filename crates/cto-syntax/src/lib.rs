//! # cto-syntax — CTO Schema Language Front End
//!
//! Turns schema source text into a [`ast::ModelFile`] syntax tree.
//!
//! ```text
//! namespace org.acme.hr
//! import org.acme.base.Address
//!
//! @Doc("A person")
//! abstract participant Person identified by email {
//!   o String email regex=/^[^@]+@[^@]+$/
//!   o Address address optional
//!   --> Person manager optional
//! }
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `cto-core`.
//! - Names are kept exactly as written; qualification happens downstream.
//! - Malformed input yields a [`ParseError`], never a panic.

pub mod ast;
pub mod lexer;
pub mod parser;

pub use ast::ModelFile;
pub use lexer::escape_string;
pub use parser::{parse, ParseError, ParseErrorKind};
