//! Declaration file validation logic

use crate::config::declarations::{DeclarationFile, NamedDeclaration, ProviderDeclaration, TypedDeclaration};
use crate::error::DeclareError;
use anyhow::Result;
use regex::Regex;
use serde_json::Value;

/// Terraform identifier syntax for names and types
const IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_-]*$";

/// Validate a parsed declaration file
///
/// # Errors
///
/// Returns an error if:
/// - A name or type is not a valid Terraform identifier
/// - Attributes are neither a mapping nor omitted
/// - A provider with scoped objects has no alias
/// - A scoped object's type does not belong to its provider
#[inline]
pub fn validate_declarations(file: &DeclarationFile) -> Result<()> {
    let identifier = Regex::new(IDENTIFIER_PATTERN)?;

    if let Some(terraform) = file.terraform.as_ref() {
        validate_attributes("terraform", terraform)?;
    }

    for provider in &file.providers {
        validate_provider(&identifier, provider)?;
    }

    let named = [
        ("Variable", &file.variables),
        ("Output", &file.outputs),
        ("Module", &file.modules),
    ];
    for (kind, declarations) in named {
        for declaration in declarations {
            validate_named(&identifier, kind, declaration)?;
        }
    }

    for declaration in &file.data {
        validate_typed(&identifier, "Data source", declaration)?;
    }
    for declaration in &file.resources {
        validate_typed(&identifier, "Resource", declaration)?;
    }

    Ok(())
}

fn validate_provider(identifier: &Regex, provider: &ProviderDeclaration) -> Result<()> {
    let context = format!("Provider '{}'", provider.name);
    validate_identifier(identifier, &context, &provider.name)?;
    validate_attributes(&context, &provider.attributes)?;

    if !provider.has_scoped_objects() {
        return Ok(());
    }

    if provider.alias().is_none_or(str::is_empty) {
        return Err(DeclareError::configuration(format!(
            "{context}: an alias is required to declare data or resources under it"
        ))
        .into());
    }

    let scoped = provider
        .data
        .iter()
        .map(|declaration| ("Data source", declaration))
        .chain(provider.resources.iter().map(|declaration| ("Resource", declaration)));
    for (kind, declaration) in scoped {
        validate_typed(identifier, kind, declaration)?;
        if declaration.object_type.split('_').next() != Some(provider.name.as_str()) {
            return Err(DeclareError::configuration(format!(
                "{context}: {kind} '{}.{}' does not belong to this provider",
                declaration.object_type, declaration.name
            ))
            .into());
        }
    }

    Ok(())
}

fn validate_named(identifier: &Regex, kind: &str, declaration: &NamedDeclaration) -> Result<()> {
    let context = format!("{kind} '{}'", declaration.name);
    validate_identifier(identifier, &context, &declaration.name)?;
    validate_attributes(&context, &declaration.attributes)
}

fn validate_typed(identifier: &Regex, kind: &str, declaration: &TypedDeclaration) -> Result<()> {
    let context = format!("{kind} '{}.{}'", declaration.object_type, declaration.name);
    validate_identifier(identifier, &context, &declaration.object_type)?;
    validate_identifier(identifier, &context, &declaration.name)?;
    validate_attributes(&context, &declaration.attributes)
}

/// Validate one identifier
///
/// # Errors
///
/// Returns an error if:
/// - The identifier is empty or contains characters Terraform rejects
#[inline]
pub fn validate_identifier(identifier: &Regex, context: &str, value: &str) -> Result<()> {
    if identifier.is_match(value) {
        return Ok(());
    }
    Err(DeclareError::configuration(format!(
        "{context}: invalid identifier '{value}'. Use letters, digits, underscores and dashes, \
        starting with a letter or underscore"
    ))
    .into())
}

fn validate_attributes(context: &str, attributes: &Value) -> Result<()> {
    match *attributes {
        Value::Object(_) | Value::Null => Ok(()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            Err(DeclareError::configuration(format!(
                "{context}: attributes must be a mapping"
            ))
            .into())
        }
    }
}
