//! Input resolution for resource collections

use super::schema::Schema;
use crate::error::{DeclareError, DeclareResult};
use crate::objects::Attributes;
use crate::registry::context::{VARIANT_SUFFIX, Variant};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Resolved inputs of one collection instance
///
/// Every schema field has an entry; optional fields nobody supplied hold `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Inputs {
    values: Attributes,
}

impl Inputs {
    /// Resolved value of an input
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether the input resolved to something other than `null`
    #[must_use]
    #[inline]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|value| !value.is_null())
    }

    #[must_use]
    #[inline]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    #[inline]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    #[inline]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Input value that must be present
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input is unknown or resolved to `null`
    #[inline]
    pub fn require(&self, name: &str) -> DeclareResult<&Value> {
        self.get(name)
            .filter(|value| !value.is_null())
            .ok_or_else(|| DeclareError::programmer(format!("Input '{name}' has no value")))
    }

    /// Resolved inputs of a nested collection input
    #[must_use]
    #[inline]
    pub fn nested(&self, name: &str) -> Option<Self> {
        match self.get(name) {
            Some(Value::Object(values)) => Some(Self {
                values: values.clone(),
            }),
            _ => None,
        }
    }

    /// All resolved inputs
    #[must_use]
    #[inline]
    pub const fn values(&self) -> &Attributes {
        &self.values
    }
}

/// Resolve a collection's inputs from its arguments
///
/// For each field the first non-null source wins:
/// 1. The active variant's `<variant>_variant` mapping in `arguments`
/// 2. The plain argument
/// 3. The active variant's declared default for the field
/// 4. The field's own default
///
/// Resolved values are coerced and validated by their field.
///
/// # Errors
///
/// Returns an error if:
/// - An argument names an input the schema does not declare
/// - A `*_variant` argument is not a mapping
/// - A required input stays unresolved
/// - A value fails coercion or validation
#[inline]
pub fn resolve_inputs(
    collection: &str,
    schema: &Schema,
    mut arguments: Attributes,
    variant: Option<&Variant>,
) -> DeclareResult<Inputs> {
    let mut overrides = Attributes::new();
    let variant_keys: Vec<String> = arguments
        .keys()
        .filter(|key| key.ends_with(VARIANT_SUFFIX))
        .cloned()
        .collect();

    for key in variant_keys {
        let Some(value) = arguments.remove(&key) else {
            continue;
        };
        let Value::Object(mapping) = value else {
            return Err(DeclareError::configuration(format!(
                "'{key}' for {collection} must be a mapping of inputs"
            )));
        };
        check_known(collection, schema, mapping.keys())?;
        if variant.is_some_and(|active| active.override_key() == key) {
            overrides = mapping;
        } else {
            debug!("Ignoring inactive '{key}' for {collection}");
        }
    }

    check_known(collection, schema, arguments.keys())?;

    let mut values = Attributes::new();
    for field in schema.fields() {
        let name = field.name();
        let plain = arguments.remove(name).filter(|value| !value.is_null());
        let overridden = overrides.remove(name).filter(|value| !value.is_null());

        let resolved = match (overridden, plain) {
            (Some(value), plain) => {
                if plain.is_some() {
                    warn!(
                        "{collection}: '{name}' is set both directly and for variant '{}', using the variant value",
                        variant.map_or("", Variant::name)
                    );
                }
                Some(value)
            }
            (None, Some(value)) => Some(value),
            (None, None) => variant
                .and_then(|active| active.default_for(name))
                .filter(|value| !value.is_null())
                .or_else(|| field.default_value())
                .cloned(),
        };

        match resolved {
            Some(value) => {
                values.insert(name.to_owned(), field.resolve(value)?);
            }
            None if field.is_required() => {
                return Err(DeclareError::MissingInput {
                    collection: collection.to_owned(),
                    input: name.to_owned(),
                });
            }
            None => {
                values.insert(name.to_owned(), Value::Null);
            }
        }
    }

    Ok(Inputs { values })
}

fn check_known<'a, I>(collection: &str, schema: &Schema, names: I) -> DeclareResult<()>
where
    I: IntoIterator<Item = &'a String>,
{
    let unknown: Vec<&str> = names
        .into_iter()
        .map(String::as_str)
        .filter(|name| !schema.contains(name))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(DeclareError::configuration(format!(
        "Unknown inputs for {collection}: {}",
        unknown.join(", ")
    )))
}
