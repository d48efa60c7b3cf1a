//! # Document Loading
//!
//! Reads metamodel documents from disk. Files ending in `.yaml` or `.yml`
//! are parsed as YAML; everything else as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Whether `path` names a YAML document.
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Load a document as a JSON value.
pub fn load_document(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read document: {}", path.display()))?;
    if is_yaml(path) {
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse document YAML: {}", path.display()))
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse document JSON: {}", path.display()))
    }
}

/// The `$class` of a document root, if it has one.
pub fn root_class(document: &Value) -> Option<&str> {
    document.get("$class").and_then(Value::as_str)
}
