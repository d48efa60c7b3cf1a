//! The metamodel schema registered and used to check metamodel documents.

use std::path::PathBuf;

use cto_registry::{FieldValue, ModelRegistry, RegistryError, Serializer};
use serde_json::json;

fn metamodel_source() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("cto-metamodel")
        .join("src")
        .join("metamodel.cto");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

fn registry() -> ModelRegistry {
    let mut r = ModelRegistry::new();
    r.add_schema(&metamodel_source(), Some("concerto.metamodel"), true)
        .expect("self-schema passes structural checks");
    r
}

fn person_model() -> serde_json::Value {
    json!({
        "$class": "concerto.metamodel.Model",
        "namespace": "org.acme",
        "imports": [],
        "declarations": [{
            "$class": "concerto.metamodel.ParticipantDeclaration",
            "name": "Person",
            "isAbstract": false,
            "identified": {"$class": "concerto.metamodel.IdentifiedBy", "name": "email"},
            "properties": [
                {"$class": "concerto.metamodel.StringProperty", "name": "email",
                 "isArray": false, "isOptional": false,
                 "validator": {"$class": "concerto.metamodel.StringRegexValidator", "regex": "/^.+@.+$/"}},
                {"$class": "concerto.metamodel.IntegerProperty", "name": "age",
                 "isOptional": true,
                 "validator": {"$class": "concerto.metamodel.IntegerDomainValidator", "lower": 0}}
            ],
            "decorators": [{
                "$class": "concerto.metamodel.Decorator",
                "name": "Doc",
                "arguments": [{"$class": "concerto.metamodel.DecoratorString", "value": "A person"}]
            }]
        }]
    })
}

#[test]
fn test_self_schema_registers_cleanly() {
    let r = registry();
    assert!(r.validate_all().is_ok());
    assert_eq!(r.get_schema("concerto.metamodel").unwrap().get_all_declarations().len(), 35);
}

#[test]
fn test_model_document_accepted_and_normalized() {
    let r = registry();
    let s = Serializer::new(&r);
    let resource = s.from_json(&person_model()).expect("document conforms");
    assert_eq!(resource.class().name, "Model");

    let out = s.to_json(&resource);
    let age = &out["declarations"][0]["properties"][1];
    assert_eq!(age["isArray"], json!(false));
    assert_eq!(age["validator"]["lower"], json!(0));
    assert!(age["validator"].get("upper").is_none());
}

#[test]
fn test_reserved_name_rejected() {
    let r = registry();
    let mut doc = person_model();
    doc["declarations"][0]["name"] = json!("nullable");
    let err = Serializer::new(&r).from_json(&doc).unwrap_err();
    assert_eq!(err.violations().len(), 1);
    assert_eq!(err.violations().violations()[0].instance_path, "/declarations/0/name");
}

#[test]
fn test_abstract_variant_rejected() {
    let r = registry();
    let mut doc = person_model();
    doc["declarations"][0]["properties"][0]["$class"] = json!("concerto.metamodel.Property");
    let err = Serializer::new(&r).from_json(&doc).unwrap_err();
    assert!(err.to_string().contains("abstract"));
}

#[test]
fn test_wrong_variant_for_field_rejected() {
    let r = registry();
    let mut doc = person_model();
    doc["declarations"][0]["properties"][0] = json!({
        "$class": "concerto.metamodel.ImportAll",
        "namespace": "x.y"
    });
    let err = Serializer::new(&r).from_json(&doc).unwrap_err();
    assert!(err.to_string().contains("is not a concerto.metamodel.Property"));
}

#[test]
fn test_decorator_number_is_double() {
    let r = registry();
    let doc = json!({
        "$class": "concerto.metamodel.Decorator",
        "name": "Weight",
        "arguments": [{"$class": "concerto.metamodel.DecoratorNumber", "value": 3}]
    });
    let resource = Serializer::new(&r).from_json(&doc).unwrap();
    let Some(FieldValue::Array(args)) = resource.get("arguments") else {
        panic!("arguments missing");
    };
    let FieldValue::Resource(number) = &args[0] else {
        panic!("not a resource");
    };
    assert_eq!(number.get("value"), Some(&FieldValue::Double(3.0)));
}

#[test]
fn test_registry_rejects_schema_importing_unknown_namespace() {
    let mut r = registry();
    let err = r
        .add_schema("namespace org.acme\nimport org.other.Thing\nconcept A {}", None, true)
        .unwrap_err();
    assert!(matches!(err, RegistryError::ValidationFailed { .. }));
}
