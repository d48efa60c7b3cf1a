//! # Registry Bridge
//!
//! Moves schemas between [`Models`] and a [`ModelRegistry`], and offers the
//! text-to-model entry points built on the same pieces.
//!
//! Models enter a registry as unparsed text, so the registry parses and
//! checks exactly what a user would write. Registry errors are returned
//! unchanged.

use cto_registry::ModelRegistry;

use crate::error::MetamodelError;
use crate::lower::lower_model;
use crate::model::{Model, Models};
use crate::resolve::resolve_model;
use crate::unparse::unparse_model;
use crate::validate::{validate_model, validate_models};

/// Build a registry holding every model, then run its full structural
/// validation.
///
/// With `validate`, the model set is first checked against the metamodel
/// schema. Members are not re-checked one by one.
///
/// # Errors
///
/// `SchemaValidation` from the optional check, otherwise the registry's own
/// `Registry` error for text that fails to parse, a duplicate namespace, or
/// a failed cross-schema check.
pub fn models_to_registry(models: &Models, validate: bool) -> Result<ModelRegistry, MetamodelError> {
    let checked;
    let models = if validate {
        checked = validate_models(models)?;
        &checked
    } else {
        models
    };

    let mut registry = ModelRegistry::new();
    for model in &models.models {
        let source = unparse_model(model);
        registry.add_schema(&source, None, false)?;
    }
    registry.validate_all()?;
    tracing::debug!(schemas = registry.len(), "models ingested into registry");
    Ok(registry)
}

/// Lower every schema in `registry`, in registration order.
///
/// With `validate`, each model is checked against the metamodel schema;
/// with `resolve`, its type references are qualified against the registry.
///
/// # Errors
///
/// `Lowering`, `SchemaValidation`, or `NameResolution`.
pub fn registry_to_models(
    registry: &ModelRegistry,
    resolve: bool,
    validate: bool,
) -> Result<Models, MetamodelError> {
    let mut models = Vec::with_capacity(registry.len());
    for file in registry.files() {
        let mut model = lower_model(file.syntax())?;
        if validate {
            model = validate_model(&model)?;
        }
        if resolve {
            model = resolve_model(registry, &model)?;
        }
        models.push(model);
    }
    Ok(Models { models })
}

/// Parse and lower schema text.
///
/// # Errors
///
/// `Parse`, `Lowering`, or (with `validate`) `SchemaValidation`.
pub fn source_to_model(source: &str, validate: bool) -> Result<Model, MetamodelError> {
    let syntax = cto_syntax::parse(source)?;
    let model = lower_model(&syntax)?;
    if validate {
        return Ok(validate_model(&model)?);
    }
    Ok(model)
}

/// Parse, lower and resolve schema text against `registry`.
///
/// # Errors
///
/// As [`source_to_model`], plus `NameResolution`.
pub fn source_to_resolved_model(
    registry: &ModelRegistry,
    source: &str,
    validate: bool,
) -> Result<Model, MetamodelError> {
    let model = source_to_model(source, validate)?;
    Ok(resolve_model(registry, &model)?)
}
