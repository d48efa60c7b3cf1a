//! # Registry Errors and Violations
//!
//! Structural checks never stop at the first problem: every violation is
//! collected into a [`ValidationViolations`] list and returned in one error,
//! so callers see the full picture of a broken schema set or document.

use std::fmt;

use cto_syntax::ParseError;
use thiserror::Error;

/// Error raised by [`crate::ModelRegistry`].
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The schema text did not parse.
    #[error("failed to parse schema: {0}")]
    Parse(#[from] ParseError),

    /// A schema for this namespace is already registered.
    #[error("namespace '{0}' is already registered")]
    DuplicateNamespace(String),

    /// The caller pinned a namespace and the schema declares another.
    #[error("expected namespace '{expected}', schema declares '{found}'")]
    NamespaceMismatch {
        /// Namespace the caller asked for.
        expected: String,
        /// Namespace in the schema's `namespace` line.
        found: String,
    },

    /// The base namespace cannot be registered; its types are implicit.
    #[error("namespace '{0}' is reserved for the implicit base types")]
    ReservedNamespace(String),

    /// One or more cross-schema structural checks failed.
    #[error("structural validation failed:\n{violations}")]
    ValidationFailed {
        /// Every failed check.
        violations: ValidationViolations,
    },
}

/// Error raised by [`crate::Serializer`] when an instance does not conform.
#[derive(Error, Debug)]
pub enum InstanceError {
    /// The document does not conform to the registered types.
    #[error("instance validation failed:\n{violations}")]
    ValidationFailed {
        /// Every mismatch, each with a JSON pointer into the document.
        violations: ValidationViolations,
    },
}

impl InstanceError {
    /// The collected violations.
    pub fn violations(&self) -> &ValidationViolations {
        match self {
            InstanceError::ValidationFailed { violations } => violations,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Where the problem is: a JSON pointer into an instance document, or a
    /// dotted `namespace.Declaration.property` path for schema checks.
    pub instance_path: String,
    /// Which rule fired: the qualified property being checked for
    /// instances, or the check name for schema checks.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    /// Build a violation.
    pub fn new(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Wrap a list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any violation was raised by `rule`.
    pub fn has_rule(&self, rule: &str) -> bool {
        self.violations.iter().any(|v| v.schema_path == rule)
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display_root() {
        let v = Violation::new("", "x", "expected an object");
        assert_eq!(v.to_string(), "  (root): expected an object");
    }

    #[test]
    fn test_violations_display_joined() {
        let vs = ValidationViolations::new(vec![
            Violation::new("/a", "r1", "first"),
            Violation::new("/b", "r2", "second"),
        ]);
        assert_eq!(vs.to_string(), "  /a: first\n  /b: second");
        assert!(vs.has_rule("r2"));
        assert!(!vs.has_rule("r3"));
        assert_eq!(vs.len(), 2);
    }

    #[test]
    fn test_registry_error_display() {
        let e = RegistryError::NamespaceMismatch {
            expected: "a".into(),
            found: "b".into(),
        };
        assert_eq!(e.to_string(), "expected namespace 'a', schema declares 'b'");
    }
}
