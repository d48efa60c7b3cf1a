//! # Print Subcommand
//!
//! Turns a `Model` or `Models` document back into schema text. Documents are
//! checked against the metamodel schema first unless validation is switched
//! off.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;

use cto_metamodel::{
    unparse_model, validate_model_document, validate_models_document, Model, Models,
};

use crate::config::WorkspaceConfig;
use crate::document::{load_document, root_class};

const MODEL_CLASS: &str = "concerto.metamodel.Model";
const MODELS_CLASS: &str = "concerto.metamodel.Models";

/// Arguments for the `cto print` subcommand.
#[derive(Args, Debug)]
pub struct PrintArgs {
    /// `Model` or `Models` document (JSON, or YAML by extension).
    #[arg(value_name = "DOCUMENT")]
    pub document: PathBuf,

    /// Write one `<namespace>.cto` file per model into this directory
    /// instead of printing.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Skip the metamodel schema check.
    #[arg(long)]
    pub no_validate: bool,
}

/// Read the models held by a document, whichever root it has.
pub fn read_models(document: &Value, validate: bool) -> Result<Vec<Model>> {
    match root_class(document) {
        Some(MODEL_CLASS) => {
            let model = if validate {
                validate_model_document(document)?
            } else {
                serde_json::from_value(document.clone())?
            };
            Ok(vec![model])
        }
        Some(MODELS_CLASS) => {
            let models: Models = if validate {
                validate_models_document(document)?
            } else {
                serde_json::from_value(document.clone())?
            };
            Ok(models.models)
        }
        Some(other) => bail!("expected a {MODEL_CLASS} or {MODELS_CLASS} document, found {other}"),
        None => bail!("document root has no $class"),
    }
}

fn write_models(models: &[Model], dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    for model in models {
        let path = dir.join(format!("{}.cto", model.namespace));
        std::fs::write(&path, unparse_model(model))
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "schema written");
    }
    Ok(())
}

/// Execute the print subcommand.
pub fn run_print(args: &PrintArgs, config: &WorkspaceConfig) -> Result<u8> {
    let document = load_document(&args.document)?;
    let validate = config.validate && !args.no_validate;
    let models = read_models(&document, validate)
        .with_context(|| format!("cannot print {}", args.document.display()))?;

    match &args.out_dir {
        Some(dir) => write_models(&models, dir)?,
        None => {
            let texts: Vec<String> = models.iter().map(unparse_model).collect();
            println!("{}", texts.join("\n\n"));
        }
    }
    Ok(0)
}
