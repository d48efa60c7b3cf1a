//! # Error Types — Metamodel Pipeline
//!
//! One enum per pipeline stage, aggregated by [`MetamodelError`]. Registry
//! and parse failures raised while ingesting unparsed text are wrapped
//! unchanged so callers see the registry's own diagnosis.

use cto_core::PrimitiveType;
use cto_registry::{RegistryError, ValidationViolations};
use cto_syntax::ParseError;
use thiserror::Error;

/// A syntax tree that cannot be lowered.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoweringError {
    /// A `default=` literal does not parse as the field's type.
    #[error("default {literal:?} of {declaration}.{property} is not a valid {kind}")]
    InvalidDefault {
        /// Declaring class.
        declaration: String,
        /// Field name.
        property: String,
        /// Field type.
        kind: PrimitiveType,
        /// Literal as written.
        literal: String,
    },

    /// A `range=` bound does not parse as the field's type.
    #[error("range bound {literal:?} of {declaration}.{property} is not a valid {kind}")]
    InvalidBound {
        /// Declaring class.
        declaration: String,
        /// Field name.
        property: String,
        /// Field type.
        kind: PrimitiveType,
        /// Literal as written.
        literal: String,
    },

    /// An import path with no namespace part.
    #[error("malformed import path {0:?}")]
    MalformedImport(String),
}

/// A type name that cannot be bound to a namespace.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameResolutionError {
    /// An import names a namespace the registry does not hold.
    #[error("namespace {namespace} imported by {importer} is not registered")]
    UnknownNamespace {
        /// Imported namespace.
        namespace: String,
        /// Namespace of the importing model.
        importer: String,
    },

    /// An `import ns.Name` whose target namespace does not declare `Name`.
    #[error("declaration {name} in namespace {namespace} not found")]
    MissingImport {
        /// Imported declaration.
        name: String,
        /// Namespace searched.
        namespace: String,
    },

    /// A referenced type with no binding in the name table.
    #[error("name {name} not found in {namespace}")]
    Unbound {
        /// Bare type name.
        name: String,
        /// Namespace of the model being resolved.
        namespace: String,
    },
}

/// A document that does not conform to the metamodel schema.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The embedded metamodel schema failed to load.
    #[error("metamodel schema unavailable: {0}")]
    SchemaUnavailable(#[from] RegistryError),

    /// The document root is not the expected metamodel class.
    #[error("expected a {expected} document, found {found}")]
    UnexpectedRoot {
        /// Qualified class wanted at the root.
        expected: String,
        /// `$class` found, or a description of the value.
        found: String,
    },

    /// The serializer rejected the document.
    #[error("document does not conform to the metamodel:\n{violations}")]
    Nonconforming {
        /// Every mismatch, with JSON pointers.
        violations: ValidationViolations,
    },

    /// Conversion between the typed tree and JSON failed.
    #[error("metamodel JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Any failure of the metamodel pipeline.
#[derive(Error, Debug)]
pub enum MetamodelError {
    /// Schema text did not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Lowering failed.
    #[error("lowering error: {0}")]
    Lowering(#[from] LoweringError),

    /// Name resolution failed.
    #[error("name resolution error: {0}")]
    NameResolution(#[from] NameResolutionError),

    /// Self-schema validation failed.
    #[error("schema validation error: {0}")]
    SchemaValidation(#[from] SchemaValidationError),

    /// The registry rejected unparsed text.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}
