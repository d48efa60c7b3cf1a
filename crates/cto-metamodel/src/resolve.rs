//! # Name Resolution
//!
//! Qualifies every type reference of a [`Model`] with the namespace that
//! declares it.
//!
//! ## Name Table
//!
//! [`NameTable::build`] applies bindings in a fixed sequence; a later binding
//! of the same name replaces an earlier one:
//!
//! 1. the five implicit root types, bound to the base namespace;
//! 2. each import in declaration order (`import ns.Name` binds one name,
//!    `import ns.*` binds every declaration of `ns`);
//! 3. each local declaration, bound to the model's own namespace.
//!
//! Precedence is therefore local > later import > earlier import > built-in.
//!
//! ## Rewriting
//!
//! Declarations and properties are visited in order. For a class the super
//! type is qualified first, then each property (its type, then its
//! decorators), then the class decorators. Enum members' decorators are
//! visited before the enum's own. Only `TypeIdentifier::namespace` changes.
//! Rewriting runs on a copy; on failure nothing is returned.

use std::collections::HashMap;

use cto_core::{ClassKind, BASE_NAMESPACE};
use cto_registry::ModelRegistry;

use crate::error::NameResolutionError;
use crate::model::{Declaration, Decorator, DecoratorLiteral, Import, Model, TypeIdentifier};

/// Where a binding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// One of the implicit root types.
    BuiltIn,
    /// The import at this position of `Model::imports`.
    Import {
        /// Index into the model's imports.
        index: usize,
    },
    /// A declaration of the model itself.
    Local,
}

/// A name bound to its namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameBinding {
    /// Bare type name.
    pub name: String,
    /// Declaring namespace.
    pub namespace: String,
    /// Origin of the binding.
    pub source: BindingSource,
}

/// Ordered bindings from bare names to namespaces. The last binding of a
/// name is the effective one.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    owner: String,
    bindings: Vec<NameBinding>,
    effective: HashMap<String, usize>,
}

impl NameTable {
    /// Build the table for `model` against the schemas in `registry`.
    ///
    /// # Errors
    ///
    /// `UnknownNamespace` if an import names an unregistered namespace,
    /// `MissingImport` if `import ns.Name` finds no `Name` in `ns`.
    pub fn build(registry: &ModelRegistry, model: &Model) -> Result<Self, NameResolutionError> {
        let mut table = Self {
            owner: model.namespace.clone(),
            ..Self::default()
        };

        for kind in ClassKind::all() {
            table.bind(kind.base_type(), BASE_NAMESPACE, BindingSource::BuiltIn);
        }

        for (index, import) in model.imports.iter().enumerate() {
            let namespace = import.namespace();
            let file = registry.get_schema(namespace).ok_or_else(|| {
                NameResolutionError::UnknownNamespace {
                    namespace: namespace.to_string(),
                    importer: model.namespace.clone(),
                }
            })?;
            let source = BindingSource::Import { index };
            match import {
                Import::Type { name, .. } => {
                    if file.get_local_declaration(name).is_none() {
                        return Err(NameResolutionError::MissingImport {
                            name: name.clone(),
                            namespace: namespace.to_string(),
                        });
                    }
                    table.bind(name, namespace, source);
                }
                Import::All { .. } => {
                    for decl in file.get_all_declarations() {
                        table.bind(decl.name(), namespace, source);
                    }
                }
            }
        }

        for decl in &model.declarations {
            table.bind(decl.name(), &model.namespace, BindingSource::Local);
        }

        tracing::debug!(
            namespace = %model.namespace,
            bindings = table.bindings.len(),
            names = table.effective.len(),
            "name table built"
        );
        Ok(table)
    }

    fn bind(&mut self, name: &str, namespace: &str, source: BindingSource) {
        if let Some(previous) = self.binding(name) {
            tracing::trace!(
                name,
                from = %previous.namespace,
                to = namespace,
                "binding overridden"
            );
        }
        self.effective.insert(name.to_string(), self.bindings.len());
        self.bindings.push(NameBinding {
            name: name.to_string(),
            namespace: namespace.to_string(),
            source,
        });
    }

    /// The namespace `name` resolves to.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.binding(name).map(|b| b.namespace.as_str())
    }

    /// The effective binding of `name`.
    pub fn binding(&self, name: &str) -> Option<&NameBinding> {
        self.effective.get(name).and_then(|&i| self.bindings.get(i))
    }

    /// Every binding in the order applied, including overridden ones.
    pub fn bindings(&self) -> &[NameBinding] {
        &self.bindings
    }

    /// Number of distinct names bound.
    pub fn len(&self) -> usize {
        self.effective.len()
    }

    /// Whether no name is bound.
    pub fn is_empty(&self) -> bool {
        self.effective.is_empty()
    }

    /// Qualify every type reference of `model` using this table.
    ///
    /// # Errors
    ///
    /// `Unbound` for the first reference with no binding.
    pub fn resolve(&self, model: &Model) -> Result<Model, NameResolutionError> {
        let mut working = model.clone();
        for decl in &mut working.declarations {
            self.declaration(decl)?;
        }
        Ok(working)
    }

    fn declaration(&self, decl: &mut Declaration) -> Result<(), NameResolutionError> {
        match decl {
            Declaration::Enum(e) => {
                for member in &mut e.properties {
                    self.decorators(member.decorators.as_deref_mut())?;
                }
                self.decorators(e.decorators.as_deref_mut())
            }
            Declaration::Concept(c)
            | Declaration::Asset(c)
            | Declaration::Participant(c)
            | Declaration::Transaction(c)
            | Declaration::Event(c) => {
                if let Some(super_type) = &mut c.super_type {
                    self.qualify(super_type)?;
                }
                for property in &mut c.properties {
                    if let Some(type_) = property.kind.type_identifier_mut() {
                        self.qualify(type_)?;
                    }
                    self.decorators(property.decorators.as_deref_mut())?;
                }
                self.decorators(c.decorators.as_deref_mut())
            }
        }
    }

    fn decorators(&self, decorators: Option<&mut [Decorator]>) -> Result<(), NameResolutionError> {
        for decorator in decorators.unwrap_or_default() {
            for arg in decorator.arguments.iter_mut().flatten() {
                if let DecoratorLiteral::TypeReference { type_, .. } = arg {
                    self.qualify(type_)?;
                }
            }
        }
        Ok(())
    }

    fn qualify(&self, type_: &mut TypeIdentifier) -> Result<(), NameResolutionError> {
        let namespace = self
            .lookup(&type_.name)
            .ok_or_else(|| NameResolutionError::Unbound {
                name: type_.name.clone(),
                namespace: self.owner.clone(),
            })?;
        type_.namespace = Some(namespace.to_string());
        Ok(())
    }
}

/// Qualify every type reference of `model` against `registry`.
///
/// The input is left untouched.
///
/// # Errors
///
/// Any [`NameResolutionError`] from building the table or rewriting.
pub fn resolve_model(registry: &ModelRegistry, model: &Model) -> Result<Model, NameResolutionError> {
    let table = NameTable::build(registry, model)?;
    let resolved = table.resolve(model)?;
    tracing::debug!(namespace = %model.namespace, "model resolved");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::lower_model;
    use crate::model::PropertyKind;

    fn registry(sources: &[&str]) -> ModelRegistry {
        let mut r = ModelRegistry::new();
        for s in sources {
            r.add_schema(s, None, false).unwrap();
        }
        r
    }

    fn lower(source: &str) -> Model {
        lower_model(&cto_syntax::parse(source).unwrap()).unwrap()
    }

    fn type_namespace(model: &Model, decl: &str, property: &str) -> Option<String> {
        model
            .declaration(decl)
            .and_then(Declaration::as_class)
            .and_then(|c| c.properties.iter().find(|p| p.name == property))
            .and_then(|p| p.kind.type_identifier())
            .and_then(|t| t.namespace.clone())
    }

    #[test]
    fn test_builtins_bound() {
        let r = ModelRegistry::new();
        let table = NameTable::build(&r, &lower("namespace ns.a")).unwrap();
        for name in ["Asset", "Concept", "Event", "Participant", "Transaction"] {
            assert_eq!(table.lookup(name), Some(BASE_NAMESPACE), "{name}");
        }
        assert_eq!(table.len(), 5);
        assert!(table
            .bindings()
            .iter()
            .all(|b| b.source == BindingSource::BuiltIn));
    }

    #[test]
    fn test_shadowing_local_over_imports() {
        let r = registry(&[
            "namespace n1\nconcept Foo {}\nconcept Bar {}",
            "namespace n2\nconcept Foo {}",
        ]);
        let model = lower(
            "namespace local\n\
             import n1.*\n\
             import n2.Foo\n\
             concept Foo {}\n\
             concept Holder { o Foo foo o Bar bar }",
        );
        let table = NameTable::build(&r, &model).unwrap();
        assert_eq!(table.lookup("Foo"), Some("local"));
        assert_eq!(table.binding("Foo").unwrap().source, BindingSource::Local);
        assert_eq!(table.lookup("Bar"), Some("n1"));

        let resolved = resolve_model(&r, &model).unwrap();
        assert_eq!(type_namespace(&resolved, "Holder", "foo").as_deref(), Some("local"));
        assert_eq!(type_namespace(&resolved, "Holder", "bar").as_deref(), Some("n1"));
    }

    #[test]
    fn test_later_import_wins() {
        let r = registry(&["namespace n1\nconcept Foo {}", "namespace n2\nconcept Foo {}"]);
        let model = lower(
            "namespace local\n\
             import n1.*\n\
             import n2.Foo\n\
             concept Holder { o Foo foo }",
        );
        let table = NameTable::build(&r, &model).unwrap();
        assert_eq!(table.lookup("Foo"), Some("n2"));
        assert_eq!(
            table.binding("Foo").unwrap().source,
            BindingSource::Import { index: 1 }
        );
        // Overridden bindings stay visible in order.
        let foo: Vec<_> = table
            .bindings()
            .iter()
            .filter(|b| b.name == "Foo")
            .map(|b| b.namespace.as_str())
            .collect();
        assert_eq!(foo, vec!["n1", "n2"]);
    }

    #[test]
    fn test_missing_import_target() {
        let r = registry(&["namespace ns.a\nconcept Foo {}"]);
        let model = lower("namespace ns.b\nimport ns.a.Missing");
        let err = resolve_model(&r, &model).unwrap_err();
        assert_eq!(
            err,
            NameResolutionError::MissingImport {
                name: "Missing".into(),
                namespace: "ns.a".into()
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("Missing") && msg.contains("ns.a"));
    }

    #[test]
    fn test_unknown_namespace() {
        let r = ModelRegistry::new();
        let model = lower("namespace ns.b\nimport ns.zzz.*");
        assert!(matches!(
            resolve_model(&r, &model),
            Err(NameResolutionError::UnknownNamespace { .. })
        ));
    }

    #[test]
    fn test_unbound_reference_leaves_input_untouched() {
        let r = ModelRegistry::new();
        let model = lower("namespace ns.a\nconcept A { o A self }\nconcept B { o Nope n }");
        let before = model.clone();
        let err = resolve_model(&r, &model).unwrap_err();
        assert_eq!(
            err,
            NameResolutionError::Unbound {
                name: "Nope".into(),
                namespace: "ns.a".into()
            }
        );
        assert_eq!(model, before);
    }

    #[test]
    fn test_super_type_and_decorators_qualified() {
        let r = registry(&["namespace ns.a\nconcept Base {}\nconcept Tag {}"]);
        let model = lower(
            "namespace ns.b\n\
             import ns.a.*\n\
             @Ref(Tag)\n\
             concept Child extends Base {\n\
               @Ref(Tag[])\n\
               o String name\n\
             }\n\
             enum Colour {\n\
               @Ref(Child)\n\
               o RED\n\
             }",
        );
        let resolved = resolve_model(&r, &model).unwrap();
        let child = resolved.declaration("Child").and_then(Declaration::as_class).unwrap();
        assert_eq!(child.super_type.as_ref().unwrap().namespace.as_deref(), Some("ns.a"));

        let arg_namespace = |decorators: &Option<Vec<Decorator>>| match decorators
            .as_ref()
            .and_then(|d| d[0].arguments.as_ref())
            .map(|a| &a[0])
        {
            Some(DecoratorLiteral::TypeReference { type_, .. }) => type_.namespace.clone(),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(arg_namespace(&child.decorators).as_deref(), Some("ns.a"));
        assert_eq!(arg_namespace(&child.properties[0].decorators).as_deref(), Some("ns.a"));

        let Some(Declaration::Enum(colour)) = resolved.declaration("Colour") else {
            panic!("enum missing");
        };
        assert_eq!(arg_namespace(&colour.properties[0].decorators).as_deref(), Some("ns.b"));
    }

    #[test]
    fn test_base_type_references_resolve() {
        let r = ModelRegistry::new();
        let model = lower("namespace ns.a\nconcept Log { --> Transaction tx }");
        let resolved = resolve_model(&r, &model).unwrap();
        assert_eq!(type_namespace(&resolved, "Log", "tx").as_deref(), Some(BASE_NAMESPACE));
    }

    #[test]
    fn test_resolution_idempotent() {
        let r = registry(&["namespace ns.a\nconcept Foo {}"]);
        let model = lower("namespace ns.b\nimport ns.a.Foo\nconcept Baz extends Foo { o Foo f }");
        let once = resolve_model(&r, &model).unwrap();
        let twice = resolve_model(&r, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_only_namespaces_change() {
        let r = registry(&["namespace ns.a\nconcept Foo {}"]);
        let model = lower("namespace ns.b\nimport ns.a.Foo\nconcept Baz { o Foo f optional }");
        let mut resolved = resolve_model(&r, &model).unwrap();
        for decl in &mut resolved.declarations {
            if let Declaration::Concept(c) = decl {
                for p in &mut c.properties {
                    if let PropertyKind::Object { type_, .. } = &mut p.kind {
                        type_.namespace = None;
                    }
                }
            }
        }
        assert_eq!(resolved, model);
    }
}
