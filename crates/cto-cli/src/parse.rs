//! # Parse Subcommand
//!
//! Converts schema files into one `concerto.metamodel.Models` document.
//!
//! All files are loaded into a single registry first, so `--resolve` can
//! qualify references across them. Output order follows the order the
//! files were given in.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use cto_core::CanonicalBytes;
use cto_metamodel::{registry_to_models, Models};
use cto_registry::ModelRegistry;

use crate::config::WorkspaceConfig;

/// Arguments for the `cto parse` subcommand.
#[derive(Args, Debug, Default)]
pub struct ParseArgs {
    /// Schema files to convert. Defaults to the configured `models`.
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Qualify every type reference with its namespace.
    #[arg(long)]
    pub resolve: bool,

    /// Skip the registry checks and the metamodel schema check.
    #[arg(long)]
    pub no_validate: bool,

    /// Emit canonical (JCS) JSON instead of pretty-printed JSON.
    #[arg(long)]
    pub canonical: bool,
}

/// Load every schema file into a fresh registry, in order.
pub fn load_registry(files: &[PathBuf], validate: bool) -> Result<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    for path in files {
        let source = crate::read_schema(path)?;
        let file = registry
            .add_schema(&source, None, false)
            .with_context(|| format!("failed to load {}", path.display()))?;
        tracing::info!(path = %path.display(), namespace = file.namespace(), "schema loaded");
    }
    if validate {
        registry.validate_all().context("schema set failed registry checks")?;
    }
    Ok(registry)
}

/// Convert the selected schema files to a [`Models`] tree.
pub fn parse_models(args: &ParseArgs, config: &WorkspaceConfig) -> Result<Models> {
    let files = crate::schema_paths(&args.files, config);
    if files.is_empty() {
        bail!("no schema files given and none configured");
    }
    let resolve = args.resolve || config.resolve;
    let validate = config.validate && !args.no_validate;

    let registry = load_registry(&files, validate)?;
    let models = registry_to_models(&registry, resolve, validate)
        .context("failed to convert schemas to the metamodel")?;
    tracing::debug!(models = models.models.len(), resolve, validate, "schemas converted");
    Ok(models)
}

/// Execute the parse subcommand.
pub fn run_parse(args: &ParseArgs, config: &WorkspaceConfig) -> Result<u8> {
    let models = parse_models(args, config)?;
    if args.canonical {
        let bytes = CanonicalBytes::new(&models).context("failed to canonicalize output")?;
        println!("{}", bytes.as_str());
    } else {
        println!("{}", serde_json::to_string_pretty(&models)?);
    }
    Ok(0)
}
