//! # cto-metamodel — Schema Metamodel Engine
//!
//! Converts between CTO schema text and its canonical, self-describing tree
//! form, and qualifies type names across namespaces.
//!
//! ```text
//! text ──parse──▶ syntax tree ──lower──▶ Model ──validate──▶ Model
//!                                          │                  │
//!                                          ▼                  ▼
//!                                  unparse (text)      resolve (qualified)
//! ```
//!
//! - [`lower`]: syntax tree to [`Model`].
//! - [`resolve`]: name table construction and reference qualification.
//! - [`validate`]: checks documents against the embedded metamodel schema.
//! - [`unparse`]: [`Model`] back to schema text.
//! - [`bridge`]: [`Models`] to and from a [`cto_registry::ModelRegistry`].
//!
//! ## Crate Policy
//!
//! - Every transform is a pure function of its inputs; resolution works on
//!   a copy and returns nothing on failure.
//! - Registry and parse errors are wrapped, never reinterpreted.
//! - Printed type names are always bare; qualification lives only in the tree.

pub mod bridge;
pub mod error;
pub mod lower;
pub mod model;
pub mod resolve;
pub mod unparse;
pub mod validate;

pub use bridge::{models_to_registry, registry_to_models, source_to_model, source_to_resolved_model};
pub use error::{LoweringError, MetamodelError, NameResolutionError, SchemaValidationError};
pub use lower::{lower_and_validate, lower_many, lower_model};
pub use model::{
    ClassDeclaration, Declaration, Decorator, DecoratorLiteral, DoubleDomainValidator,
    EnumDeclaration, EnumProperty, Identity, Import, IntegerDomainValidator, LongDomainValidator,
    Model, Models, Property, PropertyKind, StringRegexValidator, TypeIdentifier,
};
pub use resolve::{resolve_model, BindingSource, NameBinding, NameTable};
pub use unparse::{format_double, model_to_source, unparse_model};
pub use validate::{
    metamodel_registry, validate_document, validate_model, validate_model_document,
    validate_models, validate_models_document, METAMODEL_CTO,
};
