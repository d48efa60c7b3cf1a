//! # Validate Subcommand
//!
//! Checks metamodel documents against the embedded self-schema and prints
//! every violation with its JSON pointer. Any failing document makes the
//! exit code 1.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use cto_metamodel::{validate_document, SchemaValidationError};

use crate::document::load_document;

/// Arguments for the `cto validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Documents to check (JSON, or YAML by extension).
    #[arg(value_name = "DOCUMENT", required = true)]
    pub documents: Vec<PathBuf>,
}

/// Check one document. Returns `Ok(false)` when it does not conform.
pub fn validate_path(path: &Path) -> Result<bool> {
    let document = load_document(path)?;
    match validate_document(&document) {
        Ok(_) => {
            println!("OK: {}", path.display());
            Ok(true)
        }
        Err(SchemaValidationError::Nonconforming { violations }) => {
            println!("FAIL: {} ({} violation(s))", path.display(), violations.len());
            for violation in violations.violations() {
                println!("{violation}");
            }
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when every document conforms, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let mut had_failures = false;
    for path in &args.documents {
        had_failures |= !validate_path(path)?;
    }
    if had_failures {
        Ok(1)
    } else {
        Ok(0)
    }
}
