//! # cto-registry — Model Registry, Structural Checks, Instances
//!
//! A [`ModelRegistry`] holds parsed CTO schemas by namespace and resolves
//! type names across them. [`ModelRegistry::validate_all`] runs the
//! cross-schema structural checks in [`check`]; a [`Serializer`] reads JSON
//! documents as typed [`Resource`]s and writes them back.
//!
//! ## Crate Policy
//!
//! - Depends on `cto-core` and `cto-syntax` internally.
//! - Checks collect every violation; nothing stops at the first failure.
//! - Regex validators are compiled with the `regex` crate. The leading
//!   `^(?!a|b)` exclusion form is supported; other look-around is rejected.

pub mod check;
pub mod error;
pub mod pattern;
pub mod registry;
pub mod serializer;

pub use error::{InstanceError, RegistryError, ValidationViolations, Violation};
pub use pattern::{Pattern, PatternError};
pub use registry::{ModelFile, ModelRegistry, TypeRef};
pub use serializer::{FieldValue, Resource, Serializer};
