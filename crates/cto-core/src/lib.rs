//! # cto-core — Foundational Types for the CTO Toolchain
//!
//! This crate is the leaf of the workspace DAG. It defines the vocabulary
//! shared by the parser, the model registry, and the metamodel engine.
//!
//! ## Key Design Principles
//!
//! 1. **Closed kind enums.** `ClassKind` (asset, concept, event, participant,
//!    transaction) and `PrimitiveType` (Boolean, DateTime, Double, Integer,
//!    Long, String) are single definitions with exhaustive `match` everywhere.
//!    Adding a kind forces every consumer to handle it.
//!
//! 2. **Reserved namespaces as constants.** The base namespace housing the
//!    implicit root types and the metamodel's own namespace are defined once.
//!
//! 3. **`QualifiedName` instead of string splitting.** Import paths and
//!    `$class` values are parsed into namespace + name exactly once.
//!
//! 4. **`CanonicalBytes` for structural comparison.** Metamodel documents are
//!    compared and emitted through RFC 8785 canonical bytes.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cto-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod error;
pub mod kind;
pub mod name;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, CoreError};
pub use kind::{ClassKind, PrimitiveType, CLASS_KIND_COUNT};
pub use name::{ImportTarget, QualifiedName, BASE_NAMESPACE, METAMODEL_NAMESPACE};
