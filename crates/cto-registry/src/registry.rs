//! # Model Registry
//!
//! Holds parsed schemas indexed by namespace, in insertion order. Each
//! [`ModelFile`] keeps its source text and syntax tree and answers
//! declaration lookups; [`ModelFile::resolve_type`] applies the scoping
//! rule shared by every consumer:
//!
//! 1. a declaration local to the file,
//! 2. otherwise the last import that supplies the name,
//! 3. otherwise one of the implicit base types in [`BASE_NAMESPACE`].

use cto_core::{ClassKind, ImportTarget, QualifiedName, BASE_NAMESPACE};
use cto_syntax::ast::{self, ClassDeclaration, Declaration};
use indexmap::IndexMap;

use crate::check;
use crate::error::{RegistryError, ValidationViolations};

/// A registered schema.
#[derive(Debug, Clone)]
pub struct ModelFile {
    source: String,
    syntax: ast::ModelFile,
    imports: Vec<ImportTarget>,
}

impl ModelFile {
    /// Parse `source` into a model file.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Parse` on syntax errors and
    /// `RegistryError::ValidationFailed` for a malformed import path.
    pub fn parse(source: &str) -> Result<Self, RegistryError> {
        let syntax = cto_syntax::parse(source)?;
        let mut imports = Vec::with_capacity(syntax.imports.len());
        let mut violations = Vec::new();
        for import in &syntax.imports {
            match ImportTarget::from_path(&import.namespace) {
                Ok(target) => imports.push(target),
                Err(e) => violations.push(crate::Violation::new(
                    syntax.namespace.clone(),
                    check::rule::IMPORT,
                    e.to_string(),
                )),
            }
        }
        if !violations.is_empty() {
            return Err(RegistryError::ValidationFailed {
                violations: ValidationViolations::new(violations),
            });
        }
        Ok(Self {
            source: source.to_string(),
            syntax,
            imports,
        })
    }

    /// The namespace this file declares.
    pub fn namespace(&self) -> &str {
        &self.syntax.namespace
    }

    /// The text the file was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed syntax tree.
    pub fn syntax(&self) -> &ast::ModelFile {
        &self.syntax
    }

    /// Imports in declaration order.
    pub fn imports(&self) -> &[ImportTarget] {
        &self.imports
    }

    /// Look up a declaration of this file by short name.
    pub fn get_local_declaration(&self, name: &str) -> Option<&Declaration> {
        self.syntax.declaration(name)
    }

    /// Every declaration of this file, in source order.
    pub fn get_all_declarations(&self) -> &[Declaration] {
        &self.syntax.body
    }

    /// Resolve a short, non-primitive type name as seen from this file.
    pub fn resolve_type(&self, registry: &ModelRegistry, name: &str) -> Option<QualifiedName> {
        if self.get_local_declaration(name).is_some() {
            return Some(QualifiedName::new(self.namespace(), name));
        }
        for import in self.imports.iter().rev() {
            let supplies = match import {
                ImportTarget::Type(q) => {
                    q.name == name
                        && (q.namespace == BASE_NAMESPACE && ClassKind::is_base_type(name)
                            || registry.declares(&q.namespace, name))
                }
                ImportTarget::All { namespace } => registry.declares(namespace, name),
            };
            if supplies {
                return Some(QualifiedName::new(import.namespace(), name));
            }
        }
        if ClassKind::is_base_type(name) {
            return Some(QualifiedName::new(BASE_NAMESPACE, name));
        }
        None
    }
}

/// What a qualified name refers to.
#[derive(Debug, Clone, Copy)]
pub enum TypeRef<'r> {
    /// One of the five implicit root types.
    Base(ClassKind),
    /// A declared class, together with its owning file.
    Class(&'r ModelFile, &'r ClassDeclaration),
    /// A declared enum.
    Enum(&'r ModelFile, &'r ast::EnumDeclaration),
}

/// Namespace-indexed collection of parsed schemas.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    files: IndexMap<String, ModelFile>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a schema.
    ///
    /// With `expected_namespace`, the schema must declare exactly that
    /// namespace. With `validate`, the file's structural checks run against
    /// the registry as it stands, and a failing file is not kept.
    ///
    /// # Errors
    ///
    /// `Parse`, `DuplicateNamespace`, `NamespaceMismatch`,
    /// `ReservedNamespace`, or `ValidationFailed`.
    pub fn add_schema(
        &mut self,
        source: &str,
        expected_namespace: Option<&str>,
        validate: bool,
    ) -> Result<&ModelFile, RegistryError> {
        let file = ModelFile::parse(source)?;
        let namespace = file.namespace().to_string();

        if let Some(expected) = expected_namespace {
            if expected != namespace {
                return Err(RegistryError::NamespaceMismatch {
                    expected: expected.to_string(),
                    found: namespace,
                });
            }
        }
        if namespace == BASE_NAMESPACE {
            return Err(RegistryError::ReservedNamespace(namespace));
        }
        if self.files.contains_key(&namespace) {
            return Err(RegistryError::DuplicateNamespace(namespace));
        }

        self.files.insert(namespace.clone(), file);
        if validate {
            let violations = match self.files.get(&namespace) {
                Some(added) => check::check_file(self, added),
                None => Vec::new(),
            };
            if !violations.is_empty() {
                self.files.shift_remove(&namespace);
                return Err(RegistryError::ValidationFailed {
                    violations: ValidationViolations::new(violations),
                });
            }
        }
        tracing::debug!(namespace = %namespace, validate, "schema registered");

        self.files
            .get(&namespace)
            .ok_or(RegistryError::DuplicateNamespace(namespace))
    }

    /// Look up a schema by namespace.
    pub fn get_schema(&self, namespace: &str) -> Option<&ModelFile> {
        self.files.get(namespace)
    }

    /// Registered files in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &ModelFile> {
        self.files.values()
    }

    /// Registered namespaces in insertion order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether `namespace` is registered and declares `name`.
    pub fn declares(&self, namespace: &str, name: &str) -> bool {
        self.files
            .get(namespace)
            .is_some_and(|f| f.get_local_declaration(name).is_some())
    }

    /// Look up what a qualified name denotes.
    pub fn lookup(&self, name: &QualifiedName) -> Option<TypeRef<'_>> {
        if name.namespace == BASE_NAMESPACE {
            return ClassKind::from_base_type(&name.name).map(TypeRef::Base);
        }
        let file = self.files.get(&name.namespace)?;
        match file.get_local_declaration(&name.name)? {
            Declaration::Class(c) => Some(TypeRef::Class(file, c)),
            Declaration::Enum(e) => Some(TypeRef::Enum(file, e)),
        }
    }

    /// The super-type chain of a class, nearest first, excluding the class
    /// itself. Stops at base types, unresolvable names, and cycles.
    pub fn ancestors<'r>(
        &'r self,
        file: &'r ModelFile,
        class: &'r ClassDeclaration,
    ) -> Vec<(&'r ModelFile, &'r ClassDeclaration)> {
        let mut chain = Vec::new();
        let mut seen = vec![QualifiedName::new(file.namespace(), class.id.as_str())];
        let (mut file, mut class) = (file, class);
        while let Some(parent) = class.class_extension.as_deref() {
            let Some(q) = file.resolve_type(self, parent) else {
                break;
            };
            if seen.contains(&q) {
                break;
            }
            let Some(TypeRef::Class(pf, pc)) = self.lookup(&q) else {
                break;
            };
            chain.push((pf, pc));
            seen.push(q);
            (file, class) = (pf, pc);
        }
        chain
    }

    /// Whether class `sub` is `sup` or inherits from it.
    pub fn is_assignable(&self, sub: &QualifiedName, sup: &QualifiedName) -> bool {
        if sub == sup {
            return true;
        }
        let Some(TypeRef::Class(file, class)) = self.lookup(sub) else {
            return false;
        };
        if sup.namespace == BASE_NAMESPACE {
            let root = ClassKind::from_base_type(&sup.name);
            return root == Some(class.kind);
        }
        self.ancestors(file, class)
            .iter()
            .any(|(f, c)| f.namespace() == sup.namespace && c.id == sup.name)
    }

    /// Run every structural check over every registered file.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::ValidationFailed` with all violations found.
    pub fn validate_all(&self) -> Result<(), RegistryError> {
        let violations: Vec<_> = self
            .files
            .values()
            .flat_map(|file| check::check_file(self, file))
            .collect();
        tracing::debug!(
            schemas = self.files.len(),
            violations = violations.len(),
            "registry validated"
        );
        if violations.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::ValidationFailed {
                violations: ValidationViolations::new(violations),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(sources: &[&str]) -> ModelRegistry {
        let mut r = ModelRegistry::new();
        for s in sources {
            r.add_schema(s, None, false).unwrap();
        }
        r
    }

    #[test]
    fn test_add_and_lookup() {
        let r = registry(&["namespace ns.a\nconcept Foo {}\nenum E { o X }"]);
        let file = r.get_schema("ns.a").unwrap();
        assert!(file.get_local_declaration("Foo").is_some());
        assert!(file.get_local_declaration("Bar").is_none());
        assert_eq!(file.get_all_declarations().len(), 2);
        assert!(r.declares("ns.a", "E"));
        assert!(matches!(
            r.lookup(&QualifiedName::new("ns.a", "E")),
            Some(TypeRef::Enum(..))
        ));
    }

    #[test]
    fn test_duplicate_namespace_rejected() {
        let mut r = registry(&["namespace ns.a"]);
        let err = r.add_schema("namespace ns.a", None, false).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateNamespace(ns) if ns == "ns.a"));
    }

    #[test]
    fn test_expected_namespace_mismatch() {
        let mut r = ModelRegistry::new();
        let err = r.add_schema("namespace ns.a", Some("ns.b"), false).unwrap_err();
        assert!(matches!(err, RegistryError::NamespaceMismatch { .. }));
        assert!(r.is_empty());
    }

    #[test]
    fn test_base_namespace_reserved() {
        let mut r = ModelRegistry::new();
        assert!(matches!(
            r.add_schema("namespace concerto\nconcept X {}", None, false),
            Err(RegistryError::ReservedNamespace(_))
        ));
    }

    #[test]
    fn test_validated_add_rolls_back() {
        let mut r = ModelRegistry::new();
        let err = r
            .add_schema("namespace ns.a\nconcept Foo extends Missing {}", None, true)
            .unwrap_err();
        assert!(matches!(err, RegistryError::ValidationFailed { .. }));
        assert!(r.get_schema("ns.a").is_none());
    }

    #[test]
    fn test_resolve_type_precedence() {
        let r = registry(&[
            "namespace ns.one\nconcept Foo {}\nconcept Bar {}",
            "namespace ns.two\nconcept Foo {}",
            "namespace ns.local\n\
             import ns.one.*\n\
             import ns.two.Foo\n\
             concept Baz {}",
        ]);
        let local = r.get_schema("ns.local").unwrap();
        assert_eq!(
            local.resolve_type(&r, "Foo"),
            Some(QualifiedName::new("ns.two", "Foo"))
        );
        assert_eq!(
            local.resolve_type(&r, "Bar"),
            Some(QualifiedName::new("ns.one", "Bar"))
        );
        assert_eq!(
            local.resolve_type(&r, "Baz"),
            Some(QualifiedName::new("ns.local", "Baz"))
        );
        assert_eq!(
            local.resolve_type(&r, "Participant"),
            Some(QualifiedName::new(BASE_NAMESPACE, "Participant"))
        );
        assert_eq!(local.resolve_type(&r, "Nope"), None);
    }

    #[test]
    fn test_ancestors_and_assignability() {
        let r = registry(&[
            "namespace ns.a\n\
             abstract concept A {}\n\
             concept B extends A {}\n\
             concept C extends B {}",
        ]);
        let file = r.get_schema("ns.a").unwrap();
        let c = file.get_local_declaration("C").unwrap().as_class().unwrap();
        let names: Vec<_> = r.ancestors(file, c).iter().map(|(_, d)| d.id.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        let qc = QualifiedName::new("ns.a", "C");
        assert!(r.is_assignable(&qc, &QualifiedName::new("ns.a", "A")));
        assert!(r.is_assignable(&qc, &QualifiedName::new(BASE_NAMESPACE, "Concept")));
        assert!(!r.is_assignable(&qc, &QualifiedName::new(BASE_NAMESPACE, "Asset")));
        assert!(!r.is_assignable(&QualifiedName::new("ns.a", "A"), &qc));
    }

    #[test]
    fn test_ancestors_stop_at_cycle() {
        let r = registry(&["namespace ns.a\nconcept A extends B {}\nconcept B extends A {}"]);
        let file = r.get_schema("ns.a").unwrap();
        let a = file.get_local_declaration("A").unwrap().as_class().unwrap();
        assert_eq!(r.ancestors(file, a).len(), 1);
    }

    #[test]
    fn test_insertion_order_kept() {
        let r = registry(&["namespace z", "namespace a", "namespace m"]);
        assert_eq!(r.namespaces().collect::<Vec<_>>(), vec!["z", "a", "m"]);
    }
}
