//! # Kinds — Class Categories and Primitive Types
//!
//! Defines the two closed vocabularies of the schema language:
//!
//! - [`ClassKind`]: the five record categories. Each has a keyword
//!   (`asset`, `concept`, …) and an implicit root type in the base
//!   namespace (`Asset`, `Concept`, …).
//! - [`PrimitiveType`]: the six built-in field types. Any other field type
//!   name refers to a declared type.
//!
//! Every `match` on these enums must be exhaustive.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// The record categories of the schema language.
///
/// | Keyword | Root type |
/// |---------|-----------|
/// | `asset` | `Asset` |
/// | `concept` | `Concept` |
/// | `event` | `Event` |
/// | `participant` | `Participant` |
/// | `transaction` | `Transaction` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Something owned and tracked.
    Asset,
    /// A plain structured value.
    Concept,
    /// Something emitted.
    Event,
    /// An actor.
    Participant,
    /// A request to change state.
    Transaction,
}

/// Total number of class kinds.
pub const CLASS_KIND_COUNT: usize = 5;

impl ClassKind {
    /// Returns all class kinds in canonical (alphabetical) order.
    pub fn all() -> &'static [ClassKind] {
        &[
            Self::Asset,
            Self::Concept,
            Self::Event,
            Self::Participant,
            Self::Transaction,
        ]
    }

    /// The declaration keyword, e.g. `participant`.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Concept => "concept",
            Self::Event => "event",
            Self::Participant => "participant",
            Self::Transaction => "transaction",
        }
    }

    /// The implicit root type in the base namespace, e.g. `Participant`.
    pub fn base_type(&self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::Concept => "Concept",
            Self::Event => "Event",
            Self::Participant => "Participant",
            Self::Transaction => "Transaction",
        }
    }

    /// Look up a kind by its root type name.
    pub fn from_base_type(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.base_type() == name)
    }

    /// Whether `name` is one of the five implicit root types.
    pub fn is_base_type(name: &str) -> bool {
        Self::from_base_type(name).is_some()
    }
}

impl std::fmt::Display for ClassKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ClassKind {
    type Err = CoreError;

    /// Parse a class kind from its declaration keyword.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asset" => Ok(Self::Asset),
            "concept" => Ok(Self::Concept),
            "event" => Ok(Self::Event),
            "participant" => Ok(Self::Participant),
            "transaction" => Ok(Self::Transaction),
            other => Err(CoreError::UnknownClassKind(other.to_string())),
        }
    }
}

/// Built-in field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// `true` / `false`.
    Boolean,
    /// RFC 3339 timestamp.
    DateTime,
    /// IEEE 754 double.
    Double,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// UTF-8 text.
    String,
}

impl PrimitiveType {
    /// Returns all primitive types.
    pub fn all() -> &'static [PrimitiveType] {
        &[
            Self::Boolean,
            Self::DateTime,
            Self::Double,
            Self::Integer,
            Self::Long,
            Self::String,
        ]
    }

    /// The type keyword used in field declarations.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::DateTime => "DateTime",
            Self::Double => "Double",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::String => "String",
        }
    }

    /// Whether the type admits a `range=` clause.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Double | Self::Integer | Self::Long)
    }
}

impl std::fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Boolean" => Ok(Self::Boolean),
            "DateTime" => Ok(Self::DateTime),
            "Double" => Ok(Self::Double),
            "Integer" => Ok(Self::Integer),
            "Long" => Ok(Self::Long),
            "String" => Ok(Self::String),
            other => Err(CoreError::UnknownPrimitiveType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_class_kinds_count() {
        assert_eq!(ClassKind::all().len(), CLASS_KIND_COUNT);
    }

    #[test]
    fn test_keyword_roundtrip() {
        for kind in ClassKind::all() {
            let parsed: ClassKind = kind.keyword().parse().unwrap();
            assert_eq!(*kind, parsed);
        }
    }

    #[test]
    fn test_base_type_roundtrip() {
        for kind in ClassKind::all() {
            assert_eq!(ClassKind::from_base_type(kind.base_type()), Some(*kind));
            assert!(ClassKind::is_base_type(kind.base_type()));
        }
        assert!(!ClassKind::is_base_type("Person"));
        // Case-sensitive, and the trailing-space spelling is not a root type.
        assert!(!ClassKind::is_base_type("concept"));
        assert!(!ClassKind::is_base_type("Transaction "));
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("enum".parse::<ClassKind>().is_err());
        assert!("Concept".parse::<ClassKind>().is_err());
        assert!("".parse::<ClassKind>().is_err());
    }

    #[test]
    fn test_primitive_roundtrip() {
        for p in PrimitiveType::all() {
            assert_eq!(p.as_str().parse::<PrimitiveType>().unwrap(), *p);
            assert_eq!(p.to_string(), p.as_str());
        }
        assert!("Person".parse::<PrimitiveType>().is_err());
    }

    #[test]
    fn test_numeric_types() {
        let numeric: Vec<_> = PrimitiveType::all()
            .iter()
            .filter(|p| p.is_numeric())
            .collect();
        assert_eq!(
            numeric,
            vec![&PrimitiveType::Double, &PrimitiveType::Integer, &PrimitiveType::Long]
        );
    }
}
