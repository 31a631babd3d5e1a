//! YAML parser for ingestion definitions
//!
//! Parses and validates definition YAML files.

use crate::error::{Error, Result};
use crate::loader::types::IngestDefinition;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load an ingestion definition from a file path
pub fn load_definition(path: impl AsRef<Path>) -> Result<IngestDefinition> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!(
                "Failed to read definition file '{}': {e}",
                path.display()
            ))
        }
    })?;

    debug!("Loaded definition from {}", path.display());
    load_definition_from_str(&content)
}

/// Load an ingestion definition from a YAML string
pub fn load_definition_from_str(yaml: &str) -> Result<IngestDefinition> {
    let def: IngestDefinition = serde_yaml::from_str(yaml)?;
    def.validate()?;
    Ok(def)
}
