//! Input schemas for resource collections
//!
//! A [`Schema`] lists the [`Field`]s a collection accepts. Each field knows
//! its type, whether it is required, its default, and how to coerce and
//! validate a supplied value.

use super::inputs::resolve_inputs;
use super::{ResourceCollection, type_label};
use crate::error::{DeclareError, DeclareResult};
use core::fmt;
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::rc::Rc;

/// Custom validation applied after coercion; returns a message on failure
pub type CheckFn = dyn Fn(&Value) -> Result<(), String>;

/// Data type of a collection input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// Inputs of another collection, resolved against its schema
    Collection,
    Any,
}

impl fmt::Display for FieldType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Collection => "collection",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// Definition of one collection input
#[derive(Clone)]
pub struct Field {
    name: String,
    field_type: FieldType,
    required: bool,
    default: Option<Value>,
    description: Option<String>,
    constraint: Option<Value>,
    check: Option<Rc<CheckFn>>,
    nested: Option<Rc<Nested>>,
}

/// Schema of a collection accepted as an input
#[derive(Debug)]
struct Nested {
    collection: &'static str,
    schema: Schema,
}

impl Field {
    /// A required input of the given type
    #[must_use]
    #[inline]
    pub fn new<S: Into<String>>(name: S, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            default: None,
            description: None,
            constraint: None,
            check: None,
            nested: None,
        }
    }

    /// A required input holding the inputs of a `T` collection
    ///
    /// Accepts a declared [`Collection`](super::Collection) handle or a plain
    /// mapping; either way the value is resolved against `T`'s schema.
    #[must_use]
    #[inline]
    pub fn collection<T: ResourceCollection, S: Into<String>>(name: S) -> Self {
        let mut field = Self::new(name, FieldType::Collection);
        field.nested = Some(Rc::new(Nested {
            collection: type_label::<T>(),
            schema: T::schema(),
        }));
        field
    }

    /// Allow the input to stay unresolved
    #[must_use]
    #[inline]
    pub const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Value used when no other source supplies one
    #[must_use]
    #[inline]
    pub fn with_default<V: Into<Value>>(mut self, value: V) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    #[inline]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    /// JSON Schema (draft 7) the coerced value must satisfy
    #[must_use]
    #[inline]
    pub fn with_constraint(mut self, schema: Value) -> Self {
        self.constraint = Some(schema);
        self
    }

    /// Custom check run after coercion and the JSON Schema constraint
    #[must_use]
    #[inline]
    pub fn with_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + 'static,
    {
        self.check = Some(Rc::new(check));
        self
    }

    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    #[inline]
    pub const fn field_type(&self) -> FieldType {
        self.field_type
    }

    #[must_use]
    #[inline]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    #[inline]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    #[must_use]
    #[inline]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Coerce `value` into this field's type
    ///
    /// Strings convert to numbers and booleans where they parse; numbers and
    /// booleans convert to strings. Arrays, objects and `null` are never
    /// coerced. Collection inputs are resolved against the nested schema.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The value cannot be represented as this field's type
    #[inline]
    pub fn to_native(&self, value: Value) -> DeclareResult<Value> {
        match self.field_type {
            FieldType::String => self.coerce_to_string(value),
            FieldType::Integer => self.coerce_to_integer(value),
            FieldType::Number => self.coerce_to_number(value),
            FieldType::Boolean => self.coerce_to_boolean(value),
            FieldType::Array => self.expect_shape(value, Value::is_array),
            FieldType::Object => self.expect_shape(value, Value::is_object),
            FieldType::Collection => self.resolve_nested(value),
            FieldType::Any => Ok(value),
        }
    }

    /// Check a coerced value against the constraint and the custom check
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The constraint is not a valid JSON Schema
    /// - The value violates the constraint
    /// - The custom check rejects the value
    #[inline]
    pub fn validate(&self, value: &Value) -> DeclareResult<()> {
        if let Some(constraint) = self.constraint.as_ref() {
            let validator = jsonschema::options()
                .with_draft(Draft::Draft7)
                .build(constraint)
                .map_err(|e| {
                    DeclareError::programmer(format!(
                        "Invalid constraint for input '{}': {e}",
                        self.name
                    ))
                })?;

            let messages: Vec<String> = validator
                .iter_errors(value)
                .map(|e| e.to_string())
                .collect();
            if !messages.is_empty() {
                return Err(DeclareError::validation(&self.name, messages.join("; ")));
            }
        }

        if let Some(check) = self.check.as_ref() {
            check(value).map_err(|message| DeclareError::validation(&self.name, message))?;
        }

        Ok(())
    }

    /// Coerce then validate
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Coercion or validation fails
    #[inline]
    pub fn resolve(&self, value: Value) -> DeclareResult<Value> {
        let native = self.to_native(value)?;
        self.validate(&native)?;
        Ok(native)
    }

    /// A value of this field's type, for building test arguments
    #[must_use]
    #[inline]
    pub fn mock_value(&self) -> Value {
        if let Some(default) = self.default.as_ref() {
            return default.clone();
        }
        match self.field_type {
            FieldType::String | FieldType::Any => Value::String(format!("mock-{}", self.name)),
            FieldType::Integer | FieldType::Number => Value::Number(0.into()),
            FieldType::Boolean => Value::Bool(false),
            FieldType::Array => Value::Array(Vec::new()),
            FieldType::Object => Value::Object(Map::new()),
            FieldType::Collection => self
                .nested
                .as_ref()
                .map_or_else(|| Value::Object(Map::new()), |nested| nested.schema.mock_arguments()),
        }
    }

    fn coerce_to_string(&self, value: Value) -> DeclareResult<Value> {
        match value {
            Value::String(_) => Ok(value),
            Value::Number(ref n) => Ok(Value::String(n.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => Err(self.coercion_error(&value)),
        }
    }

    fn coerce_to_integer(&self, value: Value) -> DeclareResult<Value> {
        match value {
            Value::Number(ref n) if n.is_i64() || n.is_u64() => Ok(value),
            Value::Number(ref n) => match n.as_f64() {
                // Integral floats within the exactly representable range
                Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(Value::Number((f as i64).into())),
                _ => Err(self.coercion_error(&value)),
            },
            Value::String(ref s) => s
                .trim()
                .parse::<i64>()
                .map(|i| Value::Number(i.into()))
                .map_err(|_| self.coercion_error(&value)),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                Err(self.coercion_error(&value))
            }
        }
    }

    fn coerce_to_number(&self, value: Value) -> DeclareResult<Value> {
        match value {
            Value::Number(_) => Ok(value),
            Value::String(ref s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    return Ok(Value::Number(i.into()));
                }
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| self.coercion_error(&value))
            }
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
                Err(self.coercion_error(&value))
            }
        }
    }

    fn coerce_to_boolean(&self, value: Value) -> DeclareResult<Value> {
        match value {
            Value::Bool(_) => Ok(value),
            Value::String(ref s) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(self.coercion_error(&value)),
            },
            Value::Number(ref n) => n
                .as_i64()
                .map(|i| Value::Bool(i != 0))
                .ok_or_else(|| self.coercion_error(&value)),
            Value::Null | Value::Array(_) | Value::Object(_) => Err(self.coercion_error(&value)),
        }
    }

    fn expect_shape(&self, value: Value, is_shape: fn(&Value) -> bool) -> DeclareResult<Value> {
        if is_shape(&value) {
            Ok(value)
        } else {
            Err(self.coercion_error(&value))
        }
    }

    fn resolve_nested(&self, value: Value) -> DeclareResult<Value> {
        let Some(nested) = self.nested.as_ref() else {
            return Err(DeclareError::programmer(format!(
                "Input '{}' has no collection schema; use Field::collection",
                self.name
            )));
        };
        let Value::Object(arguments) = value else {
            return Err(self.coercion_error(&value));
        };
        let inputs = resolve_inputs(nested.collection, &nested.schema, arguments, None)?;
        Ok(Value::Object(inputs.values().clone()))
    }

    fn coercion_error(&self, value: &Value) -> DeclareError {
        DeclareError::validation(
            &self.name,
            format!("cannot use {value} as {}", self.field_type),
        )
    }
}

impl fmt::Debug for Field {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("constraint", &self.constraint)
            .field("check", &self.check.is_some())
            .field("nested", &self.nested.as_ref().map(|nested| nested.collection))
            .finish_non_exhaustive()
    }
}

/// The inputs a collection accepts, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field (builder pattern)
    #[must_use]
    #[inline]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name
    #[must_use]
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Arguments with a placeholder (or the default) for every field
    #[must_use]
    #[inline]
    pub fn mock_arguments(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|field| (field.name.clone(), field.mock_value()))
                .collect(),
        )
    }
}
