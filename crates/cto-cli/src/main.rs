//! # cto CLI entry point
//!
//! Parses command-line arguments, loads the workspace configuration, and
//! dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cto_cli::ast::{run_ast, AstArgs};
use cto_cli::check::{run_check, CheckArgs};
use cto_cli::parse::{run_parse, ParseArgs};
use cto_cli::print::{run_print, PrintArgs};
use cto_cli::validate::{run_validate, ValidateArgs};
use cto_cli::WorkspaceConfig;

/// CTO schema toolchain
///
/// Converts CTO schema files to and from their self-describing metamodel
/// form, resolves type names across namespaces, and checks schema sets.
#[derive(Parser, Debug)]
#[command(name = "cto", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file. Defaults to ./cto.yaml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the syntax tree of a schema file as JSON.
    Ast(AstArgs),

    /// Convert schema files to a metamodel Models document.
    Parse(ParseArgs),

    /// Convert a Model or Models document back to schema text.
    Print(PrintArgs),

    /// Check documents against the metamodel schema.
    Validate(ValidateArgs),

    /// Load schema files into a registry and run every structural check.
    Check(CheckArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("cto CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match WorkspaceConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match cli.command {
        Commands::Ast(args) => run_ast(&args),
        Commands::Parse(args) => run_parse(&args, &config),
        Commands::Print(args) => run_print(&args, &config),
        Commands::Validate(args) => run_validate(&args),
        Commands::Check(args) => run_check(&args, &config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
