//! YAML declaration file loading and parsing

use crate::config::declarations::DeclarationFile;
use crate::config::{schema, validation};
use crate::error::DeclareError;
use crate::system::System;
use anyhow::{Context as _, Result};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Load, validate and parse one declaration file
///
/// An empty file declares nothing.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The file is not valid YAML
/// - The file does not match the declaration schema
/// - Names, types or provider scopes are invalid
#[inline]
pub fn load_declarations(system: &dyn System, path: &Path) -> Result<DeclarationFile> {
    if !system.is_file(path) {
        return Err(DeclareError::filesystem(format!(
            "Declaration file not found: {}",
            path.display()
        ))
        .into());
    }

    let content = system
        .read_to_string(path)
        .map_err(|e| DeclareError::filesystem(format!("Failed to read {}: {e}", path.display())))?;

    let file = parse_declarations(&content)
        .with_context(|| format!("Invalid declaration file: {}", path.display()))?;

    debug!(
        "Loaded {} declarations from {}",
        file.object_count(),
        path.display()
    );
    Ok(file)
}

/// Parse and validate declaration file contents
///
/// # Errors
///
/// Returns an error if:
/// - The content is not valid YAML
/// - The content does not match the declaration schema
/// - Names, types or provider scopes are invalid
#[inline]
pub fn parse_declarations(content: &str) -> Result<DeclarationFile> {
    let document: Value = serde_yaml::from_str(content)
        .map_err(|e| DeclareError::configuration(format!("Failed to parse YAML: {e}")))?;

    // An empty document parses as null
    let document = match document {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    schema::validate_against_schema(&document)?;

    let file: DeclarationFile = serde_json::from_value(document)
        .map_err(|e| DeclareError::configuration(format!("Failed to read declarations: {e}")))?;

    validation::validate_declarations(&file)?;
    Ok(file)
}
