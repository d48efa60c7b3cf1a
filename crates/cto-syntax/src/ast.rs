//! # Syntax Tree
//!
//! The parser's output. Nodes mirror the source text one-to-one: names are
//! exactly as written (never qualified), literal defaults and range bounds
//! are kept as source text, and regex literals keep their pattern and
//! flags separately.
//!
//! The tree serializes with a `type` tag per node for diagnostics.

use cto_core::ClassKind;
use serde::Serialize;

use crate::lexer::RegexParts;

/// Synthetic identifier field name of `identified` without `by`.
pub const SYNTHETIC_ID_FIELD: &str = "$identifier";

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelFile {
    /// Dotted namespace from the `namespace` line.
    pub namespace: String,
    /// Imports in source order.
    pub imports: Vec<ImportDecl>,
    /// Declarations in source order.
    pub body: Vec<Declaration>,
}

impl ModelFile {
    /// Find a declaration by its short name.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.body.iter().find(|d| d.name() == name)
    }
}

/// `import a.b.Name [from uri]` or `import a.b.* [from uri]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportDecl {
    /// Full import path including the imported name or `*`.
    pub namespace: String,
    /// Optional external location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Declaration {
    /// `asset`, `concept`, `event`, `participant` or `transaction`.
    #[serde(rename = "ClassDeclaration")]
    Class(ClassDeclaration),
    /// `enum`.
    #[serde(rename = "EnumDeclaration")]
    Enum(EnumDeclaration),
}

impl Declaration {
    /// Declared name.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(c) => &c.id,
            Declaration::Enum(e) => &e.id,
        }
    }

    /// Decorators attached to the declaration.
    pub fn decorators(&self) -> &[Decorator] {
        match self {
            Declaration::Class(c) => &c.decorators,
            Declaration::Enum(e) => &e.decorators,
        }
    }

    /// The class declaration, if this is one.
    pub fn as_class(&self) -> Option<&ClassDeclaration> {
        match self {
            Declaration::Class(c) => Some(c),
            Declaration::Enum(_) => None,
        }
    }
}

/// A record declaration of one of the five class kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDeclaration {
    /// Declaration keyword.
    pub kind: ClassKind,
    /// Declared name.
    pub id: String,
    /// `abstract` prefix present.
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    /// Name after `extends`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_extension: Option<String>,
    /// Field named by `identified by`, or [`SYNTHETIC_ID_FIELD`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_field: Option<String>,
    /// Leading decorators.
    pub decorators: Vec<Decorator>,
    /// Members in source order.
    pub body: Vec<ClassMember>,
}

impl ClassDeclaration {
    /// Member names in source order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.body.iter().map(ClassMember::name)
    }

    /// Find a member by name.
    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        self.body.iter().find(|m| m.name() == name)
    }
}

/// A class body entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClassMember {
    /// `o Type name …`
    #[serde(rename = "FieldDeclaration")]
    Field(FieldDeclaration),
    /// `--> Type name …`
    #[serde(rename = "RelationshipDeclaration")]
    Relationship(RelationshipDeclaration),
}

impl ClassMember {
    /// Member name.
    pub fn name(&self) -> &str {
        match self {
            ClassMember::Field(f) => &f.id,
            ClassMember::Relationship(r) => &r.id,
        }
    }

    /// Declared type name as written.
    pub fn property_type(&self) -> &str {
        match self {
            ClassMember::Field(f) => &f.property_type,
            ClassMember::Relationship(r) => &r.property_type,
        }
    }

    /// `[]` present.
    pub fn is_array(&self) -> bool {
        match self {
            ClassMember::Field(f) => f.array,
            ClassMember::Relationship(r) => r.array,
        }
    }

    /// `optional` present.
    pub fn is_optional(&self) -> bool {
        match self {
            ClassMember::Field(f) => f.optional,
            ClassMember::Relationship(r) => r.optional,
        }
    }

    /// Decorators attached to the member.
    pub fn decorators(&self) -> &[Decorator] {
        match self {
            ClassMember::Field(f) => &f.decorators,
            ClassMember::Relationship(r) => &r.decorators,
        }
    }
}

/// `o Type[] name optional default=… range=[…] regex=/…/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDeclaration {
    /// Field name.
    pub id: String,
    /// Type name as written: a primitive keyword or a declared type.
    pub property_type: String,
    /// `[]` present.
    pub array: bool,
    /// `optional` present.
    pub optional: bool,
    /// Default literal as source text (string literals unescaped).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// `range=[lower,upper]` clause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<RangeClause>,
    /// `regex=/pattern/flags` clause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<RegexParts>,
    /// Leading decorators.
    pub decorators: Vec<Decorator>,
}

/// `range=[lower,upper]` with either side possibly blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeClause {
    /// Lower bound as written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<String>,
    /// Upper bound as written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<String>,
}

/// `--> Type[] name optional`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipDeclaration {
    /// Field name.
    pub id: String,
    /// Target type name.
    pub property_type: String,
    /// `[]` present.
    pub array: bool,
    /// `optional` present.
    pub optional: bool,
    /// Leading decorators.
    pub decorators: Vec<Decorator>,
}

/// `enum Name { o A o B }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumDeclaration {
    /// Declared name.
    pub id: String,
    /// Leading decorators.
    pub decorators: Vec<Decorator>,
    /// Members in source order.
    pub body: Vec<EnumMember>,
}

impl EnumDeclaration {
    /// Whether `name` is one of the members.
    pub fn has_member(&self, name: &str) -> bool {
        self.body.iter().any(|m| m.id == name)
    }
}

/// One `o NAME` line of an enum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    /// Member name.
    pub id: String,
    /// Leading decorators.
    pub decorators: Vec<Decorator>,
}

/// `@Name` or `@Name(args…)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decorator {
    /// Decorator name without `@`.
    pub name: String,
    /// `None` for a bare `@Name`; `Some(vec![])` for `@Name()`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<DecoratorArgument>>,
}

/// A decorator argument literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum DecoratorArgument {
    /// `"text"`
    String(String),
    /// `1.5`
    Number(f64),
    /// `true` / `false`
    Boolean(bool),
    /// `Name` or `Name[]`
    Identifier {
        /// Referenced type name.
        name: String,
        /// `[]` present.
        array: bool,
    },
}
