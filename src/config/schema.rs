//! JSON Schema validation for declaration files

use crate::error::DeclareError;
use anyhow::Result;
use jsonschema::{Draft, Validator};
use serde_json::Value;

/// Get the embedded JSON schema for declaration files
///
/// # Errors
///
/// Returns an error if:
/// - The embedded schema is not valid JSON or not a valid schema
#[inline]
pub fn get_schema() -> Result<Validator> {
    let schema_str = include_str!("../../docs/declarations.schema.json");
    let schema: Value = serde_json::from_str(schema_str).map_err(|e| {
        DeclareError::programmer(format!("Failed to parse embedded JSON schema: {e}"))
    })?;

    jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|e| DeclareError::programmer(format!("Failed to compile JSON schema: {e}")).into())
}

/// Validate a declaration document against the schema
///
/// # Errors
///
/// Returns an error if:
/// - The document does not match the schema
#[inline]
pub fn validate_against_schema(document: &Value) -> Result<()> {
    let validator = get_schema()?;

    let error_messages: Vec<String> = validator
        .iter_errors(document)
        .map(|e| format!("  - {e}"))
        .collect();

    if !error_messages.is_empty() {
        return Err(DeclareError::configuration(format!(
            "Declaration file does not match the schema:\n{}",
            error_messages.join("\n")
        ))
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn embedded_schema_compiles() {
        assert!(get_schema().is_ok());
    }

    #[test]
    fn well_formed_document_passes() {
        let document = json!({
            "providers": [{"name": "aws", "attributes": {"alias": "east"}, "resources": []}],
            "resources": [{"type": "aws_instance", "name": "web", "attributes": {"ami": "x"}}],
        });
        assert!(validate_against_schema(&document).is_ok());
    }

    #[test]
    fn unknown_sections_and_missing_names_fail() {
        assert!(validate_against_schema(&json!({"locals": []})).is_err());
        assert!(validate_against_schema(&json!({"resources": [{"type": "aws_instance"}]})).is_err());
        assert!(validate_against_schema(&json!({"variables": [{"name": "x", "attributes": []}]})).is_err());
    }
}
