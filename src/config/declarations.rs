//! Declaration file model
//!
//! One YAML file declares any mix of Terraform objects:
//!
//! ```yaml
//! providers:
//!   - name: aws
//!     attributes: { region: us-west-2, alias: west2 }
//!     resources:
//!       - type: aws_instance
//!         name: web
//!         attributes: { ami: ami-123 }
//! variables:
//!   - name: region
//!     attributes: { default: us-west-2 }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An object identified by name (provider, variable, output, module)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct NamedDeclaration {
    pub name: String,

    /// Attribute mapping (`null` when omitted)
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attributes: Value,
}

/// An object identified by type and name (data source, resource)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct TypedDeclaration {
    #[serde(rename = "type")]
    pub object_type: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attributes: Value,
}

/// A provider, optionally with objects declared under its selection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct ProviderDeclaration {
    pub name: String,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub attributes: Value,

    /// Data sources that get `provider = "<name>.<alias>"` when their type matches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<TypedDeclaration>,

    /// Resources that get `provider = "<name>.<alias>"` when their type matches
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<TypedDeclaration>,
}

impl ProviderDeclaration {
    /// Whether objects are declared inside this provider's scope
    #[must_use]
    #[inline]
    pub fn has_scoped_objects(&self) -> bool {
        !self.data.is_empty() || !self.resources.is_empty()
    }

    /// The `alias` attribute, if it is a string
    #[must_use]
    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.attributes.get("alias").and_then(Value::as_str)
    }
}

/// Contents of one declaration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct DeclarationFile {
    /// Settings for the `terraform` block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terraform: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<ProviderDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<NamedDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<NamedDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<NamedDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<TypedDeclaration>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<TypedDeclaration>,
}

impl DeclarationFile {
    /// Number of objects declared, scoped ones included
    #[must_use]
    #[inline]
    pub fn object_count(&self) -> usize {
        let scoped: usize = self
            .providers
            .iter()
            .map(|provider| provider.data.len() + provider.resources.len())
            .sum();
        usize::from(self.terraform.is_some())
            + self.providers.len()
            + self.variables.len()
            + self.outputs.len()
            + self.modules.len()
            + self.data.len()
            + self.resources.len()
            + scoped
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_scoped_providers() {
        let yaml = r"
providers:
  - name: aws
    attributes:
      region: us-east-1
      alias: east1
    resources:
      - type: aws_instance
        name: web
";
        let file: DeclarationFile = serde_yaml::from_str(yaml).unwrap();
        let provider = &file.providers[0];
        assert_eq!(provider.alias(), Some("east1"));
        assert!(provider.has_scoped_objects());
        assert_eq!(provider.resources[0].object_type, "aws_instance");
        assert_eq!(provider.resources[0].attributes, Value::Null);
        assert_eq!(file.object_count(), 2);
    }

    #[test]
    fn attributes_keep_nested_values() {
        let yaml = r"
variables:
  - name: zones
    attributes:
      default: [a, b]
      prod_variant:
        default: [c]
";
        let file: DeclarationFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            file.variables[0].attributes,
            json!({"default": ["a", "b"], "prod_variant": {"default": ["c"]}})
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "variables:\n  - name: x\n    typo: 1\n";
        assert!(serde_yaml::from_str::<DeclarationFile>(yaml).is_err());
    }
}
