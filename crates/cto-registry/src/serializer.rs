//! # Instance Serializer
//!
//! Reads JSON documents as instances of registered classes and writes them
//! back. Reading is the validation step: the `$class` of every object must
//! name a concrete registered class assignable to the declared field type,
//! every property must be declared, and every value must fit its type and
//! validators. Missing properties with a `default=` take the default, so
//! the written form is the normalized form of the input.
//!
//! All problems are collected; each [`Violation`] carries a JSON pointer to
//! the offending value and the qualified property it was checked against.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use cto_core::{PrimitiveType, QualifiedName};
use cto_syntax::ast::{ClassMember, FieldDeclaration, RangeClause};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::error::{InstanceError, ValidationViolations, Violation};
use crate::pattern::{Pattern, PatternError};
use crate::registry::{ModelFile, ModelRegistry, TypeRef};

/// A validated instance of a registered class.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    class: QualifiedName,
    fields: IndexMap<String, FieldValue>,
}

/// A validated property value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// `Boolean`
    Boolean(bool),
    /// `String`
    String(String),
    /// `DateTime`
    DateTime(DateTime<FixedOffset>),
    /// `Double`
    Double(f64),
    /// `Integer`
    Integer(i32),
    /// `Long`
    Long(i64),
    /// A member of an enum.
    Enum(String),
    /// A relationship, held as its reference string.
    Relationship(String),
    /// A nested class instance.
    Resource(Box<Resource>),
    /// Any of the above, for `[]` properties.
    Array(Vec<FieldValue>),
}

impl Resource {
    /// The concrete class of this instance.
    pub fn class(&self) -> &QualifiedName {
        &self.class
    }

    /// A property value, if present.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Properties in declaration order, inherited ones first.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Write the instance as a JSON object with a leading `$class`.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("$class".to_string(), Value::String(self.class.to_string()));
        for (name, value) in &self.fields {
            map.insert(name.clone(), value.to_json());
        }
        Value::Object(map)
    }
}

impl FieldValue {
    fn to_json(&self) -> Value {
        match self {
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::String(s) | FieldValue::Enum(s) | FieldValue::Relationship(s) => {
                Value::String(s.clone())
            }
            FieldValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FieldValue::Double(d) => Number::from_f64(*d).map_or(Value::Null, Value::Number),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Long(l) => Value::from(*l),
            FieldValue::Resource(r) => r.to_json(),
            FieldValue::Array(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
        }
    }
}

/// Reads and writes instances against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Serializer<'r> {
    registry: &'r ModelRegistry,
}

impl<'r> Serializer<'r> {
    /// Create a serializer over `registry`.
    pub fn new(registry: &'r ModelRegistry) -> Self {
        Self { registry }
    }

    /// Validate `value` and build the instance it describes.
    ///
    /// # Errors
    ///
    /// Returns `InstanceError::ValidationFailed` listing every mismatch.
    pub fn from_json(&self, value: &Value) -> Result<Resource, InstanceError> {
        let mut reader = Reader {
            registry: self.registry,
            violations: Vec::new(),
            patterns: HashMap::new(),
        };
        let resource = reader.resource(value, "", None);
        match resource {
            Some(resource) if reader.violations.is_empty() => Ok(resource),
            _ => Err(InstanceError::ValidationFailed {
                violations: ValidationViolations::new(reader.violations),
            }),
        }
    }

    /// Write an instance back to JSON.
    pub fn to_json(&self, resource: &Resource) -> Value {
        resource.to_json()
    }
}

struct Reader<'r> {
    registry: &'r ModelRegistry,
    violations: Vec<Violation>,
    patterns: HashMap<(String, String), Result<Pattern, PatternError>>,
}

impl<'r> Reader<'r> {
    fn fail(&mut self, path: &str, schema_path: &str, message: impl Into<String>) {
        self.violations.push(Violation::new(path, schema_path, message));
    }

    fn resource(
        &mut self,
        value: &Value,
        path: &str,
        expected: Option<&QualifiedName>,
    ) -> Option<Resource> {
        let registry = self.registry;
        let schema_path = expected.map(ToString::to_string).unwrap_or_default();
        let Some(obj) = value.as_object() else {
            self.fail(path, &schema_path, "expected an object");
            return None;
        };
        let Some(class_name) = obj.get("$class").and_then(Value::as_str) else {
            self.fail(path, &schema_path, "missing $class");
            return None;
        };
        let Ok(class) = QualifiedName::parse(class_name) else {
            self.fail(path, &schema_path, format!("malformed $class {class_name:?}"));
            return None;
        };
        let Some(TypeRef::Class(file, decl)) = registry.lookup(&class) else {
            self.fail(path, &schema_path, format!("unknown class {class}"));
            return None;
        };
        if decl.is_abstract {
            self.fail(path, &schema_path, format!("cannot instantiate abstract class {class}"));
            return None;
        }
        if let Some(expected) = expected {
            if !registry.is_assignable(&class, expected) {
                self.fail(path, &schema_path, format!("{class} is not a {expected}"));
                return None;
            }
        }

        // Own members override inherited ones of the same name.
        let mut members: IndexMap<&str, (&'r ModelFile, &'r ClassMember)> = IndexMap::new();
        let mut lineage = registry.ancestors(file, decl);
        lineage.reverse();
        lineage.push((file, decl));
        for (f, c) in lineage {
            for m in &c.body {
                members.insert(m.name(), (f, m));
            }
        }

        for key in obj.keys() {
            if key != "$class" && !members.contains_key(key.as_str()) {
                self.fail(
                    &pointer(path, key),
                    &format!("{class}.{key}"),
                    format!("unknown property {key}"),
                );
            }
        }

        let mut fields = IndexMap::new();
        for (name, (f, member)) in members {
            let child = pointer(path, name);
            let rule = format!("{class}.{name}");
            let value = match obj.get(name).filter(|v| !v.is_null()) {
                Some(v) => self.member_value(f, member, v, &child, &rule),
                None => match member {
                    ClassMember::Field(field) if field.default.is_some() && !field.array => {
                        self.default_value(f, member, field, &child, &rule)
                    }
                    _ if member.is_optional() => continue,
                    _ => {
                        self.fail(&child, &rule, format!("missing required property {name}"));
                        continue;
                    }
                },
            };
            if let Some(value) = value {
                fields.insert(name.to_string(), value);
            }
        }

        Some(Resource { class, fields })
    }

    fn default_value(
        &mut self,
        file: &ModelFile,
        member: &ClassMember,
        field: &FieldDeclaration,
        path: &str,
        rule: &str,
    ) -> Option<FieldValue> {
        let text = field.default.as_deref().unwrap_or_default();
        let value = match field.property_type.parse::<PrimitiveType>() {
            Ok(PrimitiveType::Boolean) => Value::Bool(text == "true"),
            Ok(PrimitiveType::Double | PrimitiveType::Integer | PrimitiveType::Long) => {
                match Number::from_str(text) {
                    Ok(n) => Value::Number(n),
                    Err(_) => {
                        self.fail(path, rule, format!("default {text:?} is not a number"));
                        return None;
                    }
                }
            }
            Ok(PrimitiveType::String | PrimitiveType::DateTime) | Err(_) => {
                Value::String(text.to_string())
            }
        };
        self.scalar(file, member, &value, path, rule)
    }

    fn member_value(
        &mut self,
        file: &ModelFile,
        member: &ClassMember,
        value: &Value,
        path: &str,
        rule: &str,
    ) -> Option<FieldValue> {
        if !member.is_array() {
            return self.scalar(file, member, value, path, rule);
        }
        let Some(items) = value.as_array() else {
            self.fail(path, rule, "expected an array");
            return None;
        };
        let mut out = Vec::with_capacity(items.len());
        let mut complete = true;
        for (i, item) in items.iter().enumerate() {
            match self.scalar(file, member, item, &format!("{path}/{i}"), rule) {
                Some(v) => out.push(v),
                None => complete = false,
            }
        }
        complete.then_some(FieldValue::Array(out))
    }

    fn scalar(
        &mut self,
        file: &ModelFile,
        member: &ClassMember,
        value: &Value,
        path: &str,
        rule: &str,
    ) -> Option<FieldValue> {
        match member {
            ClassMember::Relationship(_) => match value.as_str() {
                Some(s) => Some(FieldValue::Relationship(s.to_string())),
                None => {
                    self.fail(path, rule, "expected a relationship reference string");
                    None
                }
            },
            ClassMember::Field(field) => match field.property_type.parse::<PrimitiveType>() {
                Ok(p) => self.primitive(p, field, value, path, rule),
                Err(_) => self.object(file, &field.property_type, value, path, rule),
            },
        }
    }

    fn primitive(
        &mut self,
        kind: PrimitiveType,
        field: &FieldDeclaration,
        value: &Value,
        path: &str,
        rule: &str,
    ) -> Option<FieldValue> {
        let range = field.range.as_ref();
        let result = match kind {
            PrimitiveType::Boolean => value.as_bool().map(FieldValue::Boolean),
            PrimitiveType::String => match value.as_str() {
                Some(s) => {
                    if let Some(re) = &field.regex {
                        match self.pattern_matches(&re.pattern, &re.flags, s) {
                            Ok(true) => {}
                            Ok(false) => self.fail(
                                path,
                                rule,
                                format!("value {s:?} does not match /{}/{}", re.pattern, re.flags),
                            ),
                            Err(e) => self.fail(path, rule, e.to_string()),
                        }
                    }
                    Some(FieldValue::String(s.to_string()))
                }
                None => None,
            },
            PrimitiveType::DateTime => value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(FieldValue::DateTime),
            PrimitiveType::Double => value.as_f64().map(|d| {
                self.check_range(d, range, path, rule);
                FieldValue::Double(d)
            }),
            PrimitiveType::Integer => match integral(value) {
                Some(n) => match i32::try_from(n) {
                    Ok(i) => {
                        self.check_range(i, range, path, rule);
                        Some(FieldValue::Integer(i))
                    }
                    Err(_) => {
                        self.fail(path, rule, format!("{n} is out of range for Integer"));
                        return None;
                    }
                },
                None => None,
            },
            PrimitiveType::Long => integral(value).map(|l| {
                self.check_range(l, range, path, rule);
                FieldValue::Long(l)
            }),
        };
        if result.is_none() {
            self.fail(path, rule, format!("expected a {kind}, found {}", describe(value)));
        }
        result
    }

    fn object(
        &mut self,
        file: &ModelFile,
        type_name: &str,
        value: &Value,
        path: &str,
        rule: &str,
    ) -> Option<FieldValue> {
        let registry = self.registry;
        let Some(q) = file.resolve_type(registry, type_name) else {
            self.fail(path, rule, format!("type {type_name} is not declared"));
            return None;
        };
        match registry.lookup(&q) {
            Some(TypeRef::Enum(_, e)) => match value.as_str() {
                Some(s) if e.has_member(s) => Some(FieldValue::Enum(s.to_string())),
                Some(s) => {
                    self.fail(path, rule, format!("{s:?} is not a value of enum {q}"));
                    None
                }
                None => {
                    self.fail(path, rule, format!("expected a value of enum {q}"));
                    None
                }
            },
            Some(TypeRef::Class(..) | TypeRef::Base(_)) => self
                .resource(value, path, Some(&q))
                .map(|r| FieldValue::Resource(Box::new(r))),
            None => {
                self.fail(path, rule, format!("type {q} is not declared"));
                None
            }
        }
    }

    fn check_range<T>(&mut self, value: T, range: Option<&RangeClause>, path: &str, rule: &str)
    where
        T: PartialOrd + FromStr + Display + Copy,
    {
        let Some(range) = range else {
            return;
        };
        let bound = |text: Option<&String>| text.map(|t| t.parse::<T>().map_err(|_| t.clone()));
        match (bound(range.lower.as_ref()), bound(range.upper.as_ref())) {
            (Some(Err(t)), _) | (_, Some(Err(t))) => {
                self.fail(path, rule, format!("range bound {t} does not fit the field type"));
            }
            (lower, upper) => {
                let below = matches!(lower, Some(Ok(l)) if value < l);
                let above = matches!(upper, Some(Ok(u)) if value > u);
                if below || above {
                    self.fail(
                        path,
                        rule,
                        format!(
                            "{value} is outside range [{},{}]",
                            range.lower.as_deref().unwrap_or_default(),
                            range.upper.as_deref().unwrap_or_default()
                        ),
                    );
                }
            }
        }
    }

    fn pattern_matches(&mut self, pattern: &str, flags: &str, value: &str) -> Result<bool, PatternError> {
        let compiled = self
            .patterns
            .entry((pattern.to_string(), flags.to_string()))
            .or_insert_with(|| Pattern::compile(pattern, flags));
        match compiled {
            Ok(p) => Ok(p.is_match(value)),
            Err(e) => Err(e.clone()),
        }
    }
}

/// Whole numbers, including floats with no fractional part.
fn integral(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= 9_007_199_254_740_992.0)
            .map(|f| f as i64)
    })
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Append a JSON pointer segment (RFC 6901 escaping).
fn pointer(base: &str, segment: &str) -> String {
    format!("{base}/{}", segment.replace('~', "~0").replace('/', "~1"))
}
