//! # Lowering — Syntax Tree to Metamodel
//!
//! A pure, per-node mapping from [`cto_syntax::ast`] to [`crate::model`].
//! Type names stay bare; [`crate::resolve`] qualifies them later.
//!
//! - Imports of the base namespace are dropped; its five root types are
//!   always in scope.
//! - Field types outside the six primitives become object properties.
//! - Numeric defaults and bounds are parsed for the field's type; a literal
//!   that does not parse is a [`LoweringError`]. A missing bound stays
//!   missing.
//! - A super type that is one of the five root types is not recorded.
//! - Enum members carry a name and decorators only.

use cto_core::{ClassKind, ImportTarget, PrimitiveType, BASE_NAMESPACE};
use cto_syntax::ast::{self, SYNTHETIC_ID_FIELD};

use crate::error::{LoweringError, MetamodelError};
use crate::model::{
    ClassDeclaration, Declaration, Decorator, DecoratorLiteral, DoubleDomainValidator,
    EnumDeclaration, EnumProperty, Identity, Import, IntegerDomainValidator,
    LongDomainValidator, Model, Models, Property, PropertyKind, StringRegexValidator,
    TypeIdentifier,
};
use crate::validate::validate_model;

/// Lower one parsed file.
///
/// # Errors
///
/// Returns [`LoweringError`] for a numeric literal that does not fit its
/// field type or a malformed import path.
pub fn lower_model(file: &ast::ModelFile) -> Result<Model, LoweringError> {
    let mut imports = Vec::with_capacity(file.imports.len());
    for import in &file.imports {
        let target = ImportTarget::from_path(&import.namespace)
            .map_err(|_| LoweringError::MalformedImport(import.namespace.clone()))?;
        if target.namespace() == BASE_NAMESPACE {
            continue;
        }
        let uri = import.uri.clone();
        imports.push(match target {
            ImportTarget::All { namespace } => Import::All { namespace, uri },
            ImportTarget::Type(q) => Import::Type {
                namespace: q.namespace,
                name: q.name,
                uri,
            },
        });
    }

    let declarations = file
        .body
        .iter()
        .map(lower_declaration)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        namespace = %file.namespace,
        declarations = declarations.len(),
        "model lowered"
    );
    Ok(Model {
        namespace: file.namespace.clone(),
        imports,
        declarations,
    })
}

/// Lower several files, preserving their order.
///
/// # Errors
///
/// Fails on the first file that does not lower.
pub fn lower_many<'a>(
    files: impl IntoIterator<Item = &'a ast::ModelFile>,
) -> Result<Models, LoweringError> {
    let models = files
        .into_iter()
        .map(lower_model)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Models { models })
}

/// Lower one file and check the result against the metamodel schema.
///
/// # Errors
///
/// `Lowering` or `SchemaValidation`.
pub fn lower_and_validate(file: &ast::ModelFile) -> Result<Model, MetamodelError> {
    let model = lower_model(file)?;
    Ok(validate_model(&model)?)
}

fn lower_declaration(decl: &ast::Declaration) -> Result<Declaration, LoweringError> {
    match decl {
        ast::Declaration::Enum(e) => Ok(Declaration::Enum(lower_enum(e))),
        ast::Declaration::Class(c) => Ok(Declaration::class(c.kind, lower_class(c)?)),
    }
}

fn lower_class(class: &ast::ClassDeclaration) -> Result<ClassDeclaration, LoweringError> {
    let super_type = class
        .class_extension
        .as_deref()
        .filter(|name| !ClassKind::is_base_type(name))
        .map(TypeIdentifier::unresolved);

    let identified = class.id_field.as_deref().map(|field| {
        if field == SYNTHETIC_ID_FIELD {
            Identity::Identified
        } else {
            Identity::IdentifiedBy {
                name: field.to_string(),
            }
        }
    });

    let properties = class
        .body
        .iter()
        .map(|member| lower_member(&class.id, member))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ClassDeclaration {
        name: class.id.clone(),
        decorators: lower_decorators(&class.decorators),
        is_abstract: class.is_abstract,
        identified,
        super_type,
        properties,
    })
}

fn lower_member(owner: &str, member: &ast::ClassMember) -> Result<Property, LoweringError> {
    let kind = match member {
        ast::ClassMember::Relationship(r) => PropertyKind::Relationship {
            type_: TypeIdentifier::unresolved(&r.property_type),
        },
        ast::ClassMember::Field(f) => lower_field_kind(owner, f)?,
    };
    Ok(Property {
        name: member.name().to_string(),
        is_array: member.is_array(),
        is_optional: member.is_optional(),
        decorators: lower_decorators(member.decorators()),
        kind,
    })
}

fn lower_field_kind(
    owner: &str,
    field: &ast::FieldDeclaration,
) -> Result<PropertyKind, LoweringError> {
    let Ok(primitive) = field.property_type.parse::<PrimitiveType>() else {
        return Ok(PropertyKind::Object {
            type_: TypeIdentifier::unresolved(&field.property_type),
            default_value: field.default.clone(),
        });
    };
    let literals = Literals {
        owner,
        field,
        kind: primitive,
    };

    Ok(match primitive {
        PrimitiveType::Boolean => PropertyKind::Boolean {
            default_value: field.default.as_deref().map(|d| d == "true"),
        },
        PrimitiveType::DateTime => PropertyKind::DateTime,
        PrimitiveType::String => PropertyKind::String {
            default_value: field.default.clone(),
            validator: field.regex.as_ref().map(|r| StringRegexValidator {
                regex: format!("/{}/{}", r.pattern, r.flags),
            }),
        },
        PrimitiveType::Double => PropertyKind::Double {
            default_value: literals.default()?,
            validator: literals
                .range()?
                .map(|(lower, upper)| DoubleDomainValidator { lower, upper }),
        },
        PrimitiveType::Integer => PropertyKind::Integer {
            default_value: literals.default()?,
            validator: literals
                .range()?
                .map(|(lower, upper)| IntegerDomainValidator { lower, upper }),
        },
        PrimitiveType::Long => PropertyKind::Long {
            default_value: literals.default()?,
            validator: literals
                .range()?
                .map(|(lower, upper)| LongDomainValidator { lower, upper }),
        },
    })
}

/// Numeric literal parsing for one field.
struct Literals<'a> {
    owner: &'a str,
    field: &'a ast::FieldDeclaration,
    kind: PrimitiveType,
}

impl Literals<'_> {
    fn default<T: NumericLiteral>(&self) -> Result<Option<T>, LoweringError> {
        self.field
            .default
            .as_deref()
            .map(|text| {
                T::parse_literal(text).ok_or_else(|| LoweringError::InvalidDefault {
                    declaration: self.owner.to_string(),
                    property: self.field.id.clone(),
                    kind: self.kind,
                    literal: text.to_string(),
                })
            })
            .transpose()
    }

    #[allow(clippy::type_complexity)]
    fn range<T: NumericLiteral>(&self) -> Result<Option<(Option<T>, Option<T>)>, LoweringError> {
        let Some(range) = &self.field.range else {
            return Ok(None);
        };
        let bound = |text: Option<&String>| {
            text.map(|t| {
                T::parse_literal(t).ok_or_else(|| LoweringError::InvalidBound {
                    declaration: self.owner.to_string(),
                    property: self.field.id.clone(),
                    kind: self.kind,
                    literal: t.clone(),
                })
            })
            .transpose()
        };
        Ok(Some((bound(range.lower.as_ref())?, bound(range.upper.as_ref())?)))
    }
}

trait NumericLiteral: Sized {
    fn parse_literal(text: &str) -> Option<Self>;
}

impl NumericLiteral for i32 {
    fn parse_literal(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl NumericLiteral for i64 {
    fn parse_literal(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl NumericLiteral for f64 {
    fn parse_literal(text: &str) -> Option<Self> {
        text.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

fn lower_enum(e: &ast::EnumDeclaration) -> EnumDeclaration {
    EnumDeclaration {
        name: e.id.clone(),
        decorators: lower_decorators(&e.decorators),
        properties: e
            .body
            .iter()
            .map(|m| EnumProperty {
                name: m.id.clone(),
                decorators: lower_decorators(&m.decorators),
            })
            .collect(),
    }
}

fn lower_decorators(decorators: &[ast::Decorator]) -> Option<Vec<Decorator>> {
    if decorators.is_empty() {
        return None;
    }
    Some(decorators.iter().map(lower_decorator).collect())
}

fn lower_decorator(d: &ast::Decorator) -> Decorator {
    Decorator {
        name: d.name.clone(),
        arguments: d
            .arguments
            .as_ref()
            .map(|args| args.iter().map(lower_argument).collect()),
    }
}

fn lower_argument(arg: &ast::DecoratorArgument) -> DecoratorLiteral {
    match arg {
        ast::DecoratorArgument::String(value) => DecoratorLiteral::String {
            value: value.clone(),
        },
        ast::DecoratorArgument::Number(value) => DecoratorLiteral::Number { value: *value },
        ast::DecoratorArgument::Boolean(value) => DecoratorLiteral::Boolean { value: *value },
        ast::DecoratorArgument::Identifier { name, array } => DecoratorLiteral::TypeReference {
            type_: TypeIdentifier::unresolved(name),
            is_array: *array,
        },
    }
}
