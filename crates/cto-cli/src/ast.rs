//! # Ast Subcommand
//!
//! Prints the syntax tree of one schema file as JSON, exactly as the parser
//! produced it, before any lowering.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the `cto ast` subcommand.
#[derive(Args, Debug)]
pub struct AstArgs {
    /// Schema file to parse.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Render the syntax tree of `args.file` as pretty JSON.
pub fn ast_json(args: &AstArgs) -> Result<String> {
    let source = crate::read_schema(&args.file)?;
    let syntax = cto_syntax::parse(&source)
        .with_context(|| format!("failed to parse {}", args.file.display()))?;
    Ok(serde_json::to_string_pretty(&syntax)?)
}

/// Execute the ast subcommand.
pub fn run_ast(args: &AstArgs) -> Result<u8> {
    println!("{}", ast_json(args)?);
    Ok(0)
}
