//! # Unparsing — Metamodel to Schema Text
//!
//! Prints a [`Model`] in the schema language. The output parses back to
//! the same model, and its layout is fixed:
//!
//! ```text
//! namespace ns.b
//!
//! import ns.a.Foo
//!
//! @Doc("A baz")
//! concept Baz extends Foo {
//!   o Integer count range=[0,]
//! }
//! ```
//!
//! Type names are always printed bare, even after resolution.

use cto_syntax::escape_string;

use crate::error::SchemaValidationError;
use crate::model::{
    Declaration, Decorator, DecoratorLiteral, Identity, Import, Model, Property, PropertyKind,
};
use crate::validate::validate_model;

const MEMBER_INDENT: &str = "  ";

/// Print a model as schema text.
pub fn unparse_model(model: &Model) -> String {
    let mut out = format!("namespace {}", model.namespace);
    if !model.imports.is_empty() {
        out.push('\n');
        for import in &model.imports {
            out.push_str("\nimport ");
            out.push_str(&unparse_import(import));
        }
    }
    for decl in &model.declarations {
        out.push_str("\n\n");
        out.push_str(&unparse_declaration(decl));
    }
    out
}

/// Print a model, optionally checking it against the metamodel schema first.
///
/// # Errors
///
/// With `validate`, any [`SchemaValidationError`].
pub fn model_to_source(model: &Model, validate: bool) -> Result<String, SchemaValidationError> {
    if validate {
        return Ok(unparse_model(&validate_model(model)?));
    }
    Ok(unparse_model(model))
}

/// `ns.Name [from uri]` or `ns.* [from uri]`.
pub fn unparse_import(import: &Import) -> String {
    let mut out = match import {
        Import::All { namespace, .. } => format!("{namespace}.*"),
        Import::Type {
            namespace, name, ..
        } => format!("{namespace}.{name}"),
    };
    if let Some(uri) = import.uri() {
        out.push_str(" from ");
        out.push_str(uri);
    }
    out
}

/// Print one declaration with its decorators and body.
pub fn unparse_declaration(decl: &Declaration) -> String {
    let mut out = String::new();
    match decl {
        Declaration::Enum(e) => {
            out.push_str(&unparse_decorators(e.decorators.as_deref(), ""));
            out.push_str(&format!("enum {} {{", e.name));
            for member in &e.properties {
                out.push('\n');
                out.push_str(MEMBER_INDENT);
                out.push_str(&unparse_decorators(member.decorators.as_deref(), MEMBER_INDENT));
                out.push_str("o ");
                out.push_str(&member.name);
            }
        }
        Declaration::Concept(c)
        | Declaration::Asset(c)
        | Declaration::Participant(c)
        | Declaration::Transaction(c)
        | Declaration::Event(c) => {
            out.push_str(&unparse_decorators(c.decorators.as_deref(), ""));
            if c.is_abstract {
                out.push_str("abstract ");
            }
            out.push_str(&format!("{} {} ", decl.keyword(), c.name));
            if let Some(super_type) = &c.super_type {
                out.push_str(&format!("extends {} ", super_type.name));
            }
            match &c.identified {
                Some(Identity::IdentifiedBy { name }) => {
                    out.push_str(&format!("identified by {name} "));
                }
                Some(Identity::Identified) => out.push_str("identified "),
                None => {}
            }
            out.push('{');
            for property in &c.properties {
                out.push('\n');
                out.push_str(MEMBER_INDENT);
                out.push_str(&unparse_property(property));
            }
        }
    }
    out.push_str("\n}");
    out
}

/// Print one property line, decorators first.
pub fn unparse_property(property: &Property) -> String {
    let mut out = unparse_decorators(property.decorators.as_deref(), MEMBER_INDENT);
    let mut default = String::new();
    let mut validator = String::new();

    let type_name: &str = match &property.kind {
        PropertyKind::Relationship { type_ } => {
            out.push_str("-->");
            &type_.name
        }
        PropertyKind::Object {
            type_,
            default_value,
        } => {
            if let Some(v) = default_value {
                default = format!(" default={}", escape_string(v));
            }
            &type_.name
        }
        PropertyKind::Boolean { default_value } => {
            if let Some(v) = default_value {
                default = format!(" default={v}");
            }
            "Boolean"
        }
        PropertyKind::DateTime => "DateTime",
        PropertyKind::String {
            default_value,
            validator: regex,
        } => {
            if let Some(v) = default_value {
                default = format!(" default={}", escape_string(v));
            }
            if let Some(r) = regex {
                validator = format!(" regex={}", r.regex);
            }
            "String"
        }
        PropertyKind::Double {
            default_value,
            validator: range,
        } => {
            if let Some(v) = default_value {
                default = format!(" default={}", format_double(*v));
            }
            if let Some(r) = range {
                validator = unparse_range(r.lower, r.upper, format_double);
            }
            "Double"
        }
        PropertyKind::Integer {
            default_value,
            validator: range,
        } => {
            if let Some(v) = default_value {
                default = format!(" default={v}");
            }
            if let Some(r) = range {
                validator = unparse_range(r.lower, r.upper, |v| v.to_string());
            }
            "Integer"
        }
        PropertyKind::Long {
            default_value,
            validator: range,
        } => {
            if let Some(v) = default_value {
                default = format!(" default={v}");
            }
            if let Some(r) = range {
                validator = unparse_range(r.lower, r.upper, |v| v.to_string());
            }
            "Long"
        }
    };
    if !matches!(property.kind, PropertyKind::Relationship { .. }) {
        out.push('o');
    }

    out.push(' ');
    out.push_str(type_name);
    if property.is_array {
        out.push_str("[]");
    }
    out.push(' ');
    out.push_str(&property.name);
    if property.is_optional {
        out.push_str(" optional");
    }
    out.push_str(&default);
    out.push_str(&validator);
    out
}

fn unparse_range<T>(lower: Option<T>, upper: Option<T>, bound: impl Fn(T) -> String) -> String {
    let side = |b: Option<T>| b.map(&bound).unwrap_or_default();
    format!(" range=[{},{}]", side(lower), side(upper))
}

/// A Double literal with at least one fractional digit: `2.0`, `1.5`, `-0.25`.
pub fn format_double(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Decorators one per line, each followed by a newline and `prefix`, so the
/// decorated item starts at the same indentation.
pub fn unparse_decorators(decorators: Option<&[Decorator]>, prefix: &str) -> String {
    let decorators = decorators.unwrap_or_default();
    if decorators.is_empty() {
        return String::new();
    }
    let separator = format!("\n{prefix}");
    let mut out = decorators
        .iter()
        .map(unparse_decorator)
        .collect::<Vec<_>>()
        .join(&separator);
    out.push_str(&separator);
    out
}

/// `@Name` or `@Name(arg,…)`.
pub fn unparse_decorator(decorator: &Decorator) -> String {
    let mut out = format!("@{}", decorator.name);
    if let Some(args) = &decorator.arguments {
        let args: Vec<_> = args.iter().map(unparse_decorator_argument).collect();
        out.push('(');
        out.push_str(&args.join(","));
        out.push(')');
    }
    out
}

fn unparse_decorator_argument(arg: &DecoratorLiteral) -> String {
    match arg {
        DecoratorLiteral::TypeReference { type_, is_array } => {
            format!("{}{}", type_.name, if *is_array { "[]" } else { "" })
        }
        DecoratorLiteral::String { value } => escape_string(value),
        DecoratorLiteral::Number { value } => value.to_string(),
        DecoratorLiteral::Boolean { value } => value.to_string(),
    }
}
