//! # Check Subcommand
//!
//! Loads schema files into one registry and runs every cross-schema
//! structural check, printing a summary and each violation.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;

use cto_registry::RegistryError;

use crate::config::WorkspaceConfig;
use crate::parse::load_registry;

/// Arguments for the `cto check` subcommand.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Schema files to check. Defaults to the configured `models`.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 when the schema set is consistent, 1 otherwise.
/// Files that cannot be read or parsed are operational errors.
pub fn run_check(args: &CheckArgs, config: &WorkspaceConfig) -> Result<u8> {
    let files = crate::schema_paths(&args.files, config);
    if files.is_empty() {
        bail!("no schema files given and none configured");
    }
    let registry = load_registry(&files, false)?;

    match registry.validate_all() {
        Ok(()) => {
            println!("Schemas: {}/{} passed", registry.len(), registry.len());
            Ok(0)
        }
        Err(RegistryError::ValidationFailed { violations }) => {
            println!(
                "Schemas: {} loaded, {} violation(s)",
                registry.len(),
                violations.len()
            );
            for violation in violations.violations() {
                println!(
                    "  FAIL [{}] {}: {}",
                    violation.schema_path, violation.instance_path, violation.message
                );
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_check_consistent_set() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "a.cto", "namespace ns.a\nconcept Foo {}"),
            write(dir.path(), "b.cto", "namespace ns.b\nimport ns.a.Foo\nconcept Bar { o Foo foo }"),
        ];
        let code = run_check(&CheckArgs { files }, &WorkspaceConfig::default()).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn test_check_reports_missing_import() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![write(
            dir.path(),
            "b.cto",
            "namespace ns.b\nimport ns.a.Foo\nconcept Bar { o Foo foo }",
        )];
        let code = run_check(&CheckArgs { files }, &WorkspaceConfig::default()).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn test_check_uses_configured_models() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig {
            models: vec![write(dir.path(), "a.cto", "namespace ns.a\nconcept Foo {}")],
            ..WorkspaceConfig::default()
        };
        assert_eq!(run_check(&CheckArgs::default(), &config).unwrap(), 0);
    }

    #[test]
    fn test_check_duplicate_namespace_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write(dir.path(), "a.cto", "namespace ns.a\nconcept Foo {}"),
            write(dir.path(), "a2.cto", "namespace ns.a\nconcept Bar {}"),
        ];
        assert!(run_check(&CheckArgs { files }, &WorkspaceConfig::default()).is_err());
    }
}
