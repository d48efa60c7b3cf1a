//! # Metamodel Tree
//!
//! The canonical, self-describing form of a schema. Every node serializes
//! with a `$class` tag naming its declaration in the `concerto.metamodel`
//! namespace, so a serialized [`Model`] is an instance of the metamodel
//! schema and can be checked against it (see [`crate::validate`]).
//!
//! Sum types are closed Rust enums: adding a variant forces lowering,
//! resolution and unparsing to handle it.

use cto_core::ClassKind;
use serde::{Deserialize, Serialize};

/// Reference to a declared type. `namespace` is set by resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.TypeIdentifier")]
pub struct TypeIdentifier {
    /// Short name as written in source.
    pub name: String,
    /// Owning namespace once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

impl TypeIdentifier {
    /// An unresolved reference.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
        }
    }
}

/// `@Name(args…)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.Decorator")]
pub struct Decorator {
    /// Name without `@`.
    pub name: String,
    /// `None` for `@Name`, `Some(vec![])` for `@Name()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<DecoratorLiteral>>,
}

/// A decorator argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum DecoratorLiteral {
    /// A quoted string.
    #[serde(rename = "concerto.metamodel.DecoratorString")]
    String {
        /// Unescaped text.
        value: String,
    },
    /// A number literal.
    #[serde(rename = "concerto.metamodel.DecoratorNumber")]
    Number {
        /// Literal value.
        value: f64,
    },
    /// `true` or `false`.
    #[serde(rename = "concerto.metamodel.DecoratorBoolean")]
    Boolean {
        /// Literal value.
        value: bool,
    },
    /// A type name, optionally `[]`.
    #[serde(rename = "concerto.metamodel.DecoratorTypeReference")]
    TypeReference {
        /// Referenced type.
        #[serde(rename = "type")]
        type_: TypeIdentifier,
        /// `[]` present.
        #[serde(rename = "isArray", default)]
        is_array: bool,
    },
}

/// How instances of a class are identified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Identity {
    /// `identified`: a system-assigned key.
    #[serde(rename = "concerto.metamodel.Identified")]
    Identified,
    /// `identified by name`.
    #[serde(rename = "concerto.metamodel.IdentifiedBy")]
    IdentifiedBy {
        /// Key property.
        name: String,
    },
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Declaration {
    /// `concept`
    #[serde(rename = "concerto.metamodel.ConceptDeclaration")]
    Concept(ClassDeclaration),
    /// `asset`
    #[serde(rename = "concerto.metamodel.AssetDeclaration")]
    Asset(ClassDeclaration),
    /// `participant`
    #[serde(rename = "concerto.metamodel.ParticipantDeclaration")]
    Participant(ClassDeclaration),
    /// `transaction`
    #[serde(rename = "concerto.metamodel.TransactionDeclaration")]
    Transaction(ClassDeclaration),
    /// `event`
    #[serde(rename = "concerto.metamodel.EventDeclaration")]
    Event(ClassDeclaration),
    /// `enum`
    #[serde(rename = "concerto.metamodel.EnumDeclaration")]
    Enum(EnumDeclaration),
}

impl Declaration {
    /// Wrap a class body in the variant for `kind`.
    pub fn class(kind: ClassKind, decl: ClassDeclaration) -> Self {
        match kind {
            ClassKind::Asset => Self::Asset(decl),
            ClassKind::Concept => Self::Concept(decl),
            ClassKind::Event => Self::Event(decl),
            ClassKind::Participant => Self::Participant(decl),
            ClassKind::Transaction => Self::Transaction(decl),
        }
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        match self {
            Self::Enum(e) => &e.name,
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => &c.name,
        }
    }

    /// Class kind, or `None` for an enum.
    pub fn class_kind(&self) -> Option<ClassKind> {
        match self {
            Self::Concept(_) => Some(ClassKind::Concept),
            Self::Asset(_) => Some(ClassKind::Asset),
            Self::Participant(_) => Some(ClassKind::Participant),
            Self::Transaction(_) => Some(ClassKind::Transaction),
            Self::Event(_) => Some(ClassKind::Event),
            Self::Enum(_) => None,
        }
    }

    /// The class body, unless this is an enum.
    pub fn as_class(&self) -> Option<&ClassDeclaration> {
        match self {
            Self::Enum(_) => None,
            Self::Concept(c)
            | Self::Asset(c)
            | Self::Participant(c)
            | Self::Transaction(c)
            | Self::Event(c) => Some(c),
        }
    }

    /// Declaration keyword as written in source.
    pub fn keyword(&self) -> &'static str {
        self.class_kind().map_or("enum", |k| k.keyword())
    }
}

/// Body shared by the five class declaration kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    /// Declared name.
    pub name: String,
    /// Leading decorators, absent when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<Decorator>>,
    /// `abstract` prefix.
    #[serde(default)]
    pub is_abstract: bool,
    /// `identified` clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identified: Option<Identity>,
    /// `extends` target, never one of the implicit base types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_type: Option<TypeIdentifier>,
    /// Properties in source order.
    pub properties: Vec<Property>,
}

/// `enum Name { o A o B }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    /// Declared name.
    pub name: String,
    /// Leading decorators, absent when there are none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<Decorator>>,
    /// Members in source order.
    pub properties: Vec<EnumProperty>,
}

/// An enum member. Carries a name and decorators only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.EnumProperty")]
pub struct EnumProperty {
    /// Member name.
    pub name: String,
    /// Leading decorators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<Decorator>>,
}

/// A class property: the shared header plus a typed payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property name.
    pub name: String,
    /// `[]` present.
    #[serde(default)]
    pub is_array: bool,
    /// `optional` present.
    #[serde(default)]
    pub is_optional: bool,
    /// Leading decorators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorators: Option<Vec<Decorator>>,
    /// Variant-specific part, carrying the `$class` tag.
    #[serde(flatten)]
    pub kind: PropertyKind,
}

/// The typed part of a [`Property`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum PropertyKind {
    /// `--> Type name`
    #[serde(rename = "concerto.metamodel.RelationshipProperty")]
    Relationship {
        /// Target type.
        #[serde(rename = "type")]
        type_: TypeIdentifier,
    },
    /// `o Type name` for a declared (non-primitive) type.
    #[serde(rename = "concerto.metamodel.ObjectProperty")]
    Object {
        /// Field type.
        #[serde(rename = "type")]
        type_: TypeIdentifier,
        /// Default as written, typically an enum member.
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    /// `o Boolean name`
    #[serde(rename = "concerto.metamodel.BooleanProperty")]
    Boolean {
        /// `default=`
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<bool>,
    },
    /// `o DateTime name`
    #[serde(rename = "concerto.metamodel.DateTimeProperty")]
    DateTime,
    /// `o String name`
    #[serde(rename = "concerto.metamodel.StringProperty")]
    String {
        /// `default=`
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
        /// `regex=`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validator: Option<StringRegexValidator>,
    },
    /// `o Double name`
    #[serde(rename = "concerto.metamodel.DoubleProperty")]
    Double {
        /// `default=`
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<f64>,
        /// `range=`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validator: Option<DoubleDomainValidator>,
    },
    /// `o Integer name`
    #[serde(rename = "concerto.metamodel.IntegerProperty")]
    Integer {
        /// `default=`
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<i32>,
        /// `range=`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validator: Option<IntegerDomainValidator>,
    },
    /// `o Long name`
    #[serde(rename = "concerto.metamodel.LongProperty")]
    Long {
        /// `default=`
        #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
        default_value: Option<i64>,
        /// `range=`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        validator: Option<LongDomainValidator>,
    },
}

impl PropertyKind {
    /// The referenced type for relationships and object fields.
    pub fn type_identifier(&self) -> Option<&TypeIdentifier> {
        match self {
            Self::Relationship { type_ } | Self::Object { type_, .. } => Some(type_),
            _ => None,
        }
    }

    /// Mutable access to the referenced type.
    pub fn type_identifier_mut(&mut self) -> Option<&mut TypeIdentifier> {
        match self {
            Self::Relationship { type_ } | Self::Object { type_, .. } => Some(type_),
            _ => None,
        }
    }
}

/// `regex=/pattern/flags`, kept as the literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.StringRegexValidator")]
pub struct StringRegexValidator {
    /// `/pattern/flags`
    pub regex: String,
}

/// `range=[lower,upper]` on a Double.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.DoubleDomainValidator")]
pub struct DoubleDomainValidator {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,
}

/// `range=[lower,upper]` on an Integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.IntegerDomainValidator")]
pub struct IntegerDomainValidator {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<i32>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<i32>,
}

/// `range=[lower,upper]` on a Long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.LongDomainValidator")]
pub struct LongDomainValidator {
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<i64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<i64>,
}

/// An import line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "$class")]
pub enum Import {
    /// `import ns.*`
    #[serde(rename = "concerto.metamodel.ImportAll")]
    All {
        /// Imported namespace.
        namespace: String,
        /// `from` location.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
    /// `import ns.Name`
    #[serde(rename = "concerto.metamodel.ImportType")]
    Type {
        /// Imported namespace.
        namespace: String,
        /// Imported declaration.
        name: String,
        /// `from` location.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
}

impl Import {
    /// Imported namespace.
    pub fn namespace(&self) -> &str {
        match self {
            Self::All { namespace, .. } | Self::Type { namespace, .. } => namespace,
        }
    }

    /// `from` location, if any.
    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::All { uri, .. } | Self::Type { uri, .. } => uri.as_deref(),
        }
    }
}

/// One schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.Model")]
pub struct Model {
    /// Declared namespace.
    pub namespace: String,
    /// Imports in source order, base-namespace imports elided.
    #[serde(default)]
    pub imports: Vec<Import>,
    /// Declarations in source order.
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl Model {
    /// Find a declaration by name.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name() == name)
    }
}

/// A set of schema files, the unit exchanged with a registry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "$class", rename = "concerto.metamodel.Models")]
pub struct Models {
    /// Models in registry order.
    pub models: Vec<Model>,
}
