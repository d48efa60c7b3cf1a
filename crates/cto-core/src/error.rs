//! # Error Types — Shared Error Hierarchy
//!
//! Errors raised by the foundational vocabulary. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//! Higher crates define their own enums and wrap these with `#[from]`.

use thiserror::Error;

/// Error raised while interpreting names and kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A string is not one of the five class kinds.
    #[error("unknown class kind: {0:?}")]
    UnknownClassKind(String),

    /// A string is not one of the six primitive type names.
    #[error("unknown primitive type: {0:?}")]
    UnknownPrimitiveType(String),

    /// A dotted name has no namespace part or an empty segment.
    #[error("malformed qualified name: {0:?}")]
    MalformedQualifiedName(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
