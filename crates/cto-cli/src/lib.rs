//! # cto-cli — Command-Line Interface for the CTO Metamodel Toolchain
//!
//! Provides the `cto` binary. Every subcommand is a thin wrapper over the
//! library crates; the `run_*` functions return a process exit code so the
//! binary only has to map errors to logging.
//!
//! ## Subcommands
//!
//! - `cto ast` — Dump the syntax tree of one schema file as JSON.
//! - `cto parse` — Convert schema files to a `Models` document.
//! - `cto print` — Convert a `Model` or `Models` document back to schema text.
//! - `cto validate` — Check a document against the metamodel self-schema.
//! - `cto check` — Load schema files into a registry and run every structural check.
//!
//! ```bash
//! cto parse models/*.cto --resolve > models.json
//! cto validate models.json
//! cto print models.json
//! ```

pub mod ast;
pub mod check;
pub mod config;
pub mod document;
pub mod parse;
pub mod print;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use config::WorkspaceConfig;

/// Read one schema file.
pub fn read_schema(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file: {}", path.display()))
}

/// The schema files a command should load: the ones named on the command
/// line, or the configured `models` list when none were given.
pub fn schema_paths(files: &[PathBuf], config: &WorkspaceConfig) -> Vec<PathBuf> {
    if files.is_empty() {
        config.models.clone()
    } else {
        files.to_vec()
    }
}
