//! Cross-schema structural checks.
//!
//! Each check contributes [`Violation`]s whose `instance_path` is the dotted
//! location (`namespace.Declaration.property`) and whose `schema_path` is the
//! rule name from [`rule`].

use std::collections::HashSet;

use cto_core::{ImportTarget, PrimitiveType, BASE_NAMESPACE};
use cto_syntax::ast::{
    ClassDeclaration, ClassMember, Declaration, Decorator, DecoratorArgument, EnumDeclaration,
};

use crate::error::Violation;
use crate::pattern::Pattern;
use crate::registry::{ModelFile, ModelRegistry, TypeRef};

/// Rule names reported in `Violation::schema_path`.
pub mod rule {
    /// Import of an unknown namespace or missing declaration.
    pub const IMPORT: &str = "import";
    /// Two declarations with the same name in one file.
    pub const DUPLICATE_DECLARATION: &str = "duplicate-declaration";
    /// Two members with the same name in one declaration.
    pub const DUPLICATE_PROPERTY: &str = "duplicate-property";
    /// Super type missing, an enum, of another kind, or cyclic.
    pub const SUPER_TYPE: &str = "super-type";
    /// `identified by` names no declared field.
    pub const IDENTIFIER: &str = "identifier";
    /// Field type that resolves to nothing.
    pub const PROPERTY_TYPE: &str = "property-type";
    /// Relationship to a primitive, an enum, or nothing.
    pub const RELATIONSHIP_TYPE: &str = "relationship-type";
    /// `range=` or `regex=` on a field type that cannot carry it, or a bad regex.
    pub const VALIDATOR: &str = "validator";
    /// Decorator type reference that resolves to nothing.
    pub const DECORATOR_TYPE: &str = "decorator-type";
}

/// Run every check on one file. Returns an empty list when the file is sound.
pub(crate) fn check_file(registry: &ModelRegistry, file: &ModelFile) -> Vec<Violation> {
    let mut out = Vec::new();
    check_imports(registry, file, &mut out);

    let mut seen = HashSet::new();
    for decl in file.get_all_declarations() {
        let at = format!("{}.{}", file.namespace(), decl.name());
        if !seen.insert(decl.name()) {
            out.push(Violation::new(
                &at,
                rule::DUPLICATE_DECLARATION,
                format!("duplicate declaration {}", decl.name()),
            ));
        }
        check_decorators(registry, file, decl.decorators(), &at, &mut out);
        match decl {
            Declaration::Class(class) => check_class(registry, file, class, &at, &mut out),
            Declaration::Enum(e) => check_enum(registry, file, e, &at, &mut out),
        }
    }
    out
}

fn check_imports(registry: &ModelRegistry, file: &ModelFile, out: &mut Vec<Violation>) {
    for import in file.imports() {
        let namespace = import.namespace();
        if namespace == BASE_NAMESPACE {
            continue;
        }
        let Some(target) = registry.get_schema(namespace) else {
            out.push(Violation::new(
                file.namespace(),
                rule::IMPORT,
                format!("imported namespace {namespace} is not registered"),
            ));
            continue;
        };
        if let ImportTarget::Type(q) = import {
            if target.get_local_declaration(&q.name).is_none() {
                out.push(Violation::new(
                    file.namespace(),
                    rule::IMPORT,
                    format!("declaration {} in namespace {namespace} not found", q.name),
                ));
            }
        }
    }
}

fn check_class(
    registry: &ModelRegistry,
    file: &ModelFile,
    class: &ClassDeclaration,
    at: &str,
    out: &mut Vec<Violation>,
) {
    if let Some(parent) = class.class_extension.as_deref() {
        check_super_type(registry, file, class, parent, at, out);
    }

    let mut names = HashSet::new();
    for member in &class.body {
        let member_at = format!("{at}.{}", member.name());
        if !names.insert(member.name()) {
            out.push(Violation::new(
                &member_at,
                rule::DUPLICATE_PROPERTY,
                format!("duplicate property {}", member.name()),
            ));
        }
        check_member(registry, file, member, &member_at, out);
        check_decorators(registry, file, member.decorators(), &member_at, out);
    }

    if let Some(id_field) = class.id_field.as_deref() {
        if id_field != cto_syntax::ast::SYNTHETIC_ID_FIELD {
            let declared = class.member(id_field).is_some()
                || registry
                    .ancestors(file, class)
                    .iter()
                    .any(|(_, c)| c.member(id_field).is_some());
            if !declared {
                out.push(Violation::new(
                    at,
                    rule::IDENTIFIER,
                    format!("identifying field {id_field} is not declared"),
                ));
            }
        }
    }
}

fn check_super_type(
    registry: &ModelRegistry,
    file: &ModelFile,
    class: &ClassDeclaration,
    parent: &str,
    at: &str,
    out: &mut Vec<Violation>,
) {
    let mut report = |message: String| out.push(Violation::new(at, rule::SUPER_TYPE, message));
    let Some(q) = file.resolve_type(registry, parent) else {
        report(format!("super type {parent} is not declared"));
        return;
    };
    match registry.lookup(&q) {
        Some(TypeRef::Base(_)) => {}
        Some(TypeRef::Enum(..)) => report(format!("super type {q} is an enum")),
        Some(TypeRef::Class(pf, pc)) => {
            if pc.kind != class.kind {
                report(format!(
                    "{} {} cannot extend {} {q}",
                    class.kind, class.id, pc.kind
                ));
            }
            let cyclic = pf.namespace() == file.namespace() && pc.id == class.id
                || registry.ancestors(pf, pc).iter().any(|(f, c)| {
                    f.namespace() == file.namespace() && c.id == class.id
                });
            if cyclic {
                report(format!("{} inherits from itself", class.id));
            }
        }
        None => report(format!("super type {q} is not declared")),
    }
}

fn check_member(
    registry: &ModelRegistry,
    file: &ModelFile,
    member: &ClassMember,
    at: &str,
    out: &mut Vec<Violation>,
) {
    let type_name = member.property_type();
    match member {
        ClassMember::Relationship(_) => {
            if type_name.parse::<PrimitiveType>().is_ok() {
                out.push(Violation::new(
                    at,
                    rule::RELATIONSHIP_TYPE,
                    format!("relationship to primitive type {type_name}"),
                ));
                return;
            }
            match file
                .resolve_type(registry, type_name)
                .and_then(|q| registry.lookup(&q))
            {
                None => out.push(Violation::new(
                    at,
                    rule::RELATIONSHIP_TYPE,
                    format!("relationship type {type_name} is not declared"),
                )),
                Some(TypeRef::Enum(..)) => out.push(Violation::new(
                    at,
                    rule::RELATIONSHIP_TYPE,
                    format!("relationship to enum {type_name}"),
                )),
                Some(_) => {}
            }
        }
        ClassMember::Field(field) => {
            let primitive = type_name.parse::<PrimitiveType>().ok();
            if primitive.is_none()
                && file
                    .resolve_type(registry, type_name)
                    .and_then(|q| registry.lookup(&q))
                    .is_none()
            {
                out.push(Violation::new(
                    at,
                    rule::PROPERTY_TYPE,
                    format!("property type {type_name} is not declared"),
                ));
            }
            if field.range.is_some() && !primitive.is_some_and(|p| p.is_numeric()) {
                out.push(Violation::new(
                    at,
                    rule::VALIDATOR,
                    format!("range on non-numeric type {type_name}"),
                ));
            }
            if let Some(regex) = &field.regex {
                if primitive != Some(PrimitiveType::String) {
                    out.push(Violation::new(
                        at,
                        rule::VALIDATOR,
                        format!("regex on non-String type {type_name}"),
                    ));
                } else if let Err(e) = Pattern::compile(&regex.pattern, &regex.flags) {
                    out.push(Violation::new(at, rule::VALIDATOR, e.to_string()));
                }
            }
        }
    }
}

fn check_enum(
    registry: &ModelRegistry,
    file: &ModelFile,
    decl: &EnumDeclaration,
    at: &str,
    out: &mut Vec<Violation>,
) {
    let mut names = HashSet::new();
    for member in &decl.body {
        let member_at = format!("{at}.{}", member.id);
        if !names.insert(member.id.as_str()) {
            out.push(Violation::new(
                &member_at,
                rule::DUPLICATE_PROPERTY,
                format!("duplicate enum value {}", member.id),
            ));
        }
        check_decorators(registry, file, &member.decorators, &member_at, out);
    }
}

fn check_decorators(
    registry: &ModelRegistry,
    file: &ModelFile,
    decorators: &[Decorator],
    at: &str,
    out: &mut Vec<Violation>,
) {
    let references = decorators
        .iter()
        .filter_map(|d| d.arguments.as_deref())
        .flatten()
        .filter_map(|arg| match arg {
            DecoratorArgument::Identifier { name, .. } => Some(name.as_str()),
            _ => None,
        });
    for name in references {
        if file.resolve_type(registry, name).is_none() {
            out.push(Violation::new(
                at,
                rule::DECORATOR_TYPE,
                format!("decorator argument {name} is not a declared type"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegistryError;

    fn violations(sources: &[&str]) -> crate::ValidationViolations {
        let mut r = ModelRegistry::new();
        for s in sources {
            r.add_schema(s, None, false).unwrap();
        }
        match r.validate_all() {
            Err(RegistryError::ValidationFailed { violations }) => violations,
            Ok(()) => crate::ValidationViolations::default(),
            Err(other) => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_sound_registry_passes() {
        let v = violations(&[
            "namespace ns.a\n\
             abstract participant Person identified by email { o String email }\n\
             enum Colour { o RED }",
            "namespace ns.b\n\
             import ns.a.*\n\
             participant Employee extends Person {\n\
               o Colour favourite optional\n\
               --> Person manager optional\n\
               o Integer age range=[0,150]\n\
               o String code regex=/^[A-Z]+$/\n\
             }",
        ]);
        assert!(v.is_empty(), "{v}");
    }

    #[test]
    fn test_missing_import_namespace() {
        let v = violations(&["namespace ns.a\nimport ns.zzz.Foo"]);
        assert!(v.has_rule(rule::IMPORT));
    }

    #[test]
    fn test_missing_import_declaration() {
        let v = violations(&["namespace ns.a\nconcept Foo {}", "namespace ns.b\nimport ns.a.Missing"]);
        assert_eq!(v.len(), 1);
        assert!(v.violations()[0].message.contains("Missing"));
        assert!(v.violations()[0].message.contains("ns.a"));
    }

    #[test]
    fn test_base_import_is_accepted() {
        let v = violations(&["namespace ns.a\nimport concerto.Concept\nconcept Foo extends Concept {}"]);
        assert!(v.is_empty(), "{v}");
    }

    #[test]
    fn test_duplicates() {
        let v = violations(&["namespace ns.a\nconcept Foo { o String x o Integer x }\nenum Foo { o A o A }"]);
        assert!(v.has_rule(rule::DUPLICATE_DECLARATION));
        assert_eq!(
            v.violations()
                .iter()
                .filter(|x| x.schema_path == rule::DUPLICATE_PROPERTY)
                .count(),
            2
        );
    }

    #[test]
    fn test_super_type_rules() {
        let v = violations(&[
            "namespace ns.a\n\
             enum E { o X }\n\
             asset Car identified {}\n\
             concept FromEnum extends E {}\n\
             concept FromAsset extends Car {}\n\
             concept FromNothing extends Nope {}\n\
             concept L1 extends L2 {}\n\
             concept L2 extends L1 {}",
        ]);
        let messages: Vec<_> = v
            .violations()
            .iter()
            .filter(|x| x.schema_path == rule::SUPER_TYPE)
            .map(|x| x.instance_path.as_str())
            .collect();
        assert!(messages.contains(&"ns.a.FromEnum"));
        assert!(messages.contains(&"ns.a.FromAsset"));
        assert!(messages.contains(&"ns.a.FromNothing"));
        assert!(messages.contains(&"ns.a.L1"));
        assert!(messages.contains(&"ns.a.L2"));
    }

    #[test]
    fn test_identifier_must_be_declared() {
        let v = violations(&[
            "namespace ns.a\n\
             abstract asset Base { o String id }\n\
             asset Ok identified by id extends Base {}\n\
             asset Bad identified by code {}",
        ]);
        assert_eq!(v.len(), 1);
        assert_eq!(v.violations()[0].instance_path, "ns.a.Bad");
    }

    #[test]
    fn test_relationship_rules() {
        let v = violations(&[
            "namespace ns.a\n\
             enum E { o X }\n\
             concept C {\n\
               --> String s\n\
               --> E e\n\
               --> Missing m\n\
             }",
        ]);
        assert_eq!(
            v.violations()
                .iter()
                .filter(|x| x.schema_path == rule::RELATIONSHIP_TYPE)
                .count(),
            3
        );
    }

    #[test]
    fn test_validator_placement() {
        let v = violations(&[
            "namespace ns.a\n\
             concept C {\n\
               o String s range=[1,2]\n\
               o Integer i regex=/x/\n\
               o String bad regex=/(?<=a)b/\n\
             }",
        ]);
        assert_eq!(
            v.violations()
                .iter()
                .filter(|x| x.schema_path == rule::VALIDATOR)
                .count(),
            3
        );
    }

    #[test]
    fn test_unknown_field_and_decorator_types() {
        let v = violations(&["namespace ns.a\n@Ref(Nope)\nconcept C { o Missing m }"]);
        assert!(v.has_rule(rule::PROPERTY_TYPE));
        assert!(v.has_rule(rule::DECORATOR_TYPE));
    }
}
