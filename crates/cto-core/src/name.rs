//! # Names — Namespaces and Qualified Type Names
//!
//! A type is identified by the namespace that declares it plus its short
//! name. Source schemas only ever spell short names; the dotted form
//! `ns.a.Name` appears in import paths and in `$class` values.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// The reserved namespace housing the five implicit root types.
///
/// Schemas reference `Concept`, `Asset`, … without importing this
/// namespace; explicit imports of it are dropped during lowering.
pub const BASE_NAMESPACE: &str = "concerto";

/// The namespace of the self-describing metamodel schema.
pub const METAMODEL_NAMESPACE: &str = "concerto.metamodel";

/// A namespace-qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Dotted namespace, e.g. `org.acme.hr`.
    pub namespace: String,
    /// Short type name, e.g. `Employee`.
    pub name: String,
}

impl QualifiedName {
    /// Build a qualified name from its parts.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split `ns.a.Name` at the last dot.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedQualifiedName` when the input has no dot
    /// or any dot-separated segment is empty.
    pub fn parse(dotted: &str) -> Result<Self, CoreError> {
        let (namespace, name) = split_dotted(dotted)?;
        Ok(Self::new(namespace, name))
    }

    /// Whether this names a type in the metamodel's own namespace.
    pub fn is_metamodel(&self) -> bool {
        self.namespace == METAMODEL_NAMESPACE
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

impl FromStr for QualifiedName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// The target of an `import` statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportTarget {
    /// `import ns.a.Name`: a single declaration.
    Type(QualifiedName),
    /// `import ns.a.*`: every declaration of the namespace.
    All {
        /// The imported namespace.
        namespace: String,
    },
}

impl ImportTarget {
    /// Interpret a full import path such as `ns.a.Name` or `ns.a.*`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedQualifiedName` for paths without a
    /// namespace part or with empty segments.
    pub fn from_path(path: &str) -> Result<Self, CoreError> {
        let (namespace, name) = split_dotted(path)?;
        if name == "*" {
            Ok(Self::All {
                namespace: namespace.to_string(),
            })
        } else {
            Ok(Self::Type(QualifiedName::new(namespace, name)))
        }
    }

    /// The namespace the import reaches into.
    pub fn namespace(&self) -> &str {
        match self {
            Self::Type(q) => &q.namespace,
            Self::All { namespace } => namespace,
        }
    }
}

impl std::fmt::Display for ImportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Type(q) => write!(f, "{q}"),
            Self::All { namespace } => write!(f, "{namespace}.*"),
        }
    }
}

fn split_dotted(dotted: &str) -> Result<(&str, &str), CoreError> {
    let malformed = || CoreError::MalformedQualifiedName(dotted.to_string());
    let (namespace, name) = dotted.rsplit_once('.').ok_or_else(malformed)?;
    if name.is_empty() || namespace.split('.').any(str::is_empty) {
        return Err(malformed());
    }
    Ok((namespace, name))
}
