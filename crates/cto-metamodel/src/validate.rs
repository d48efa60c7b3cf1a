//! # Self-Describing Validation
//!
//! The metamodel is itself a schema in the `concerto.metamodel` namespace,
//! compiled in as [`METAMODEL_CTO`]. Validation registers it in a fresh
//! registry, reads the document through the instance [`Serializer`] and
//! writes it back, so the result is the normalized document: defaults such
//! as `isArray: false` are filled in.
//!
//! This is a structural gate only. Type names are not resolved here.

use cto_core::{QualifiedName, METAMODEL_NAMESPACE};
use cto_registry::{InstanceError, ModelRegistry, RegistryError, Serializer};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::SchemaValidationError;
use crate::model::{Model, Models};

/// The metamodel schema source.
pub const METAMODEL_CTO: &str = include_str!("metamodel.cto");

/// A registry holding only the metamodel schema.
///
/// # Errors
///
/// Returns the registry's error if the embedded schema does not load.
pub fn metamodel_registry() -> Result<ModelRegistry, RegistryError> {
    let mut registry = ModelRegistry::new();
    registry.add_schema(METAMODEL_CTO, Some(METAMODEL_NAMESPACE), false)?;
    Ok(registry)
}

/// Check any metamodel document and return its normalized form.
///
/// # Errors
///
/// `Nonconforming` with every violation found.
pub fn validate_document(document: &Value) -> Result<Value, SchemaValidationError> {
    let registry = metamodel_registry()?;
    let serializer = Serializer::new(&registry);
    let resource = serializer.from_json(document).map_err(|e| match e {
        InstanceError::ValidationFailed { violations } => {
            SchemaValidationError::Nonconforming { violations }
        }
    })?;
    let normalized = serializer.to_json(&resource);
    tracing::debug!(class = %resource.class(), "metamodel document validated");
    Ok(normalized)
}

/// Check a `concerto.metamodel.Model` document.
///
/// # Errors
///
/// `UnexpectedRoot` for another root class, otherwise as [`validate_document`].
pub fn validate_model_document(document: &Value) -> Result<Model, SchemaValidationError> {
    validate_as(document, "Model")
}

/// Check a `concerto.metamodel.Models` document.
///
/// # Errors
///
/// `UnexpectedRoot` for another root class, otherwise as [`validate_document`].
pub fn validate_models_document(document: &Value) -> Result<Models, SchemaValidationError> {
    validate_as(document, "Models")
}

/// Check an in-memory model by serializing it first.
///
/// # Errors
///
/// As [`validate_model_document`].
pub fn validate_model(model: &Model) -> Result<Model, SchemaValidationError> {
    validate_model_document(&serde_json::to_value(model)?)
}

/// Check an in-memory model set by serializing it first.
///
/// # Errors
///
/// As [`validate_models_document`].
pub fn validate_models(models: &Models) -> Result<Models, SchemaValidationError> {
    validate_models_document(&serde_json::to_value(models)?)
}

fn validate_as<T: DeserializeOwned>(
    document: &Value,
    root: &str,
) -> Result<T, SchemaValidationError> {
    let expected = QualifiedName::new(METAMODEL_NAMESPACE, root).to_string();
    let found = match document.get("$class") {
        Some(Value::String(class)) => class.clone(),
        Some(other) => other.to_string(),
        None => "a document without $class".to_string(),
    };
    if found != expected {
        return Err(SchemaValidationError::UnexpectedRoot { expected, found });
    }
    let normalized = validate_document(document)?;
    Ok(serde_json::from_value(normalized)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn model_doc() -> Value {
        json!({
            "$class": "concerto.metamodel.Model",
            "namespace": "ns.a",
            "imports": [],
            "declarations": [{
                "$class": "concerto.metamodel.ConceptDeclaration",
                "name": "Foo",
                "properties": [{
                    "$class": "concerto.metamodel.StringProperty",
                    "name": "bar",
                    "defaultValue": "x"
                }]
            }]
        })
    }

    #[test]
    fn test_embedded_schema_loads() {
        let registry = metamodel_registry().unwrap();
        assert!(registry.validate_all().is_ok());
        assert!(registry.declares(METAMODEL_NAMESPACE, "Models"));
    }

    #[test]
    fn test_embedded_schema_keeps_license_header() {
        assert!(METAMODEL_CTO.starts_with("/*\n * Licensed under the Apache License"));
        assert!(metamodel_registry().is_ok());
    }

    #[test]
    fn test_document_normalized() {
        let model = validate_model_document(&model_doc()).unwrap();
        let foo = model.declarations[0].as_class().unwrap();
        assert!(!foo.is_abstract);
        assert!(!foo.properties[0].is_array);
        assert!(!foo.properties[0].is_optional);
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = validate_models_document(&model_doc()).unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::UnexpectedRoot { ref found, .. } if found == "concerto.metamodel.Model"
        ));
        assert!(matches!(
            validate_model_document(&json!({"namespace": "x"})),
            Err(SchemaValidationError::UnexpectedRoot { .. })
        ));
    }

    #[test]
    fn test_bad_property_name_rejected() {
        let mut doc = model_doc();
        doc["declarations"][0]["properties"][0]["name"] = json!("true");
        let err = validate_model_document(&doc).unwrap_err();
        let SchemaValidationError::Nonconforming { violations } = err else {
            panic!("expected Nonconforming");
        };
        assert_eq!(
            violations.violations()[0].instance_path,
            "/declarations/0/properties/0/name"
        );
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut doc = model_doc();
        doc["declarations"][0]
            .as_object_mut()
            .unwrap()
            .remove("properties");
        assert!(matches!(
            validate_model_document(&doc),
            Err(SchemaValidationError::Nonconforming { .. })
        ));
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let mut doc = model_doc();
        doc["declarations"][0]["$class"] = json!("concerto.metamodel.WidgetDeclaration");
        assert!(validate_model_document(&doc).is_err());
    }

    #[test]
    fn test_models_document() {
        let doc = json!({"$class": "concerto.metamodel.Models", "models": [model_doc()]});
        let models = validate_models_document(&doc).unwrap();
        assert_eq!(models.models.len(), 1);
        assert_eq!(models.models[0].namespace, "ns.a");
    }
}
