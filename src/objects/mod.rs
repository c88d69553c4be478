//! Declared configuration objects
//!
//! Every object belongs to one [`Kind`], whose category label is the top-level
//! key it compiles under. Objects are shared handles: the registry keeps one
//! clone for compilation and the declaring code keeps another for reading
//! attributes and building references to it.

pub mod duplicate_key;
pub mod reference;

pub use duplicate_key::{DuplicateKey, DuplicateKeys};
pub use reference::Reference;

use crate::document::Block;
use crate::error::{DeclareError, DeclareResult};
use core::cell::{Cell, RefCell};
use core::fmt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Attribute name to value mapping of a declared object
pub type Attributes = Map<String, Value>;

/// How a kind identifies its instances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Identity {
    /// No identity, the values are the whole block (`terraform`)
    Settings,
    /// A bare name (`variable "name"`)
    Named,
    /// A type and a name (`resource "type" "name"`)
    Typed,
}

/// The closed set of object kinds Terraform recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Kind {
    Terraform,
    Provider,
    Variable,
    Output,
    Module,
    Data,
    Resource,
}

impl Kind {
    /// Every kind, in compilation order
    pub const ALL: [Self; 7] = [
        Self::Terraform,
        Self::Provider,
        Self::Variable,
        Self::Output,
        Self::Module,
        Self::Data,
        Self::Resource,
    ];

    /// Top-level output key
    #[must_use]
    #[inline]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::Provider => "provider",
            Self::Variable => "variable",
            Self::Output => "output",
            Self::Module => "module",
            Self::Data => "data",
            Self::Resource => "resource",
        }
    }

    /// Identity shape of instances of this kind
    #[must_use]
    #[inline]
    pub const fn identity(self) -> Identity {
        match self {
            Self::Terraform => Identity::Settings,
            Self::Provider | Self::Variable | Self::Output | Self::Module => Identity::Named,
            Self::Data | Self::Resource => Identity::Typed,
        }
    }

    /// Human readable kind name used in messages
    #[must_use]
    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Terraform => "Terraform",
            Self::Provider => "Provider",
            Self::Variable => "Variable",
            Self::Output => "Output",
            Self::Module => "Module",
            Self::Data => "Data",
            Self::Resource => "Resource",
        }
    }
}

impl fmt::Display for Kind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The exact kind an object was declared as: a base kind, optionally
/// specialised under a user-chosen subtype name
///
/// Subtypes register separately but always compile under the base kind's
/// category, since Terraform only understands the canonical categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKind {
    base: Kind,
    subtype: Option<String>,
}

impl ObjectKind {
    /// A user-defined specialisation of `base`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The subtype name is empty
    #[inline]
    pub fn subtype<S: Into<String>>(base: Kind, name: S) -> DeclareResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DeclareError::programmer(format!(
                "Subtypes of {base} must have a name"
            )));
        }
        Ok(Self {
            base,
            subtype: Some(name),
        })
    }

    /// The canonical kind this object compiles as
    #[must_use]
    #[inline]
    pub const fn base(&self) -> Kind {
        self.base
    }

    /// Subtype name, if any
    #[must_use]
    #[inline]
    pub fn subtype_name(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Top-level output key (always the base kind's)
    #[must_use]
    #[inline]
    pub const fn category(&self) -> &'static str {
        self.base.category()
    }

    /// Name used in messages: the subtype name if set, else the base kind
    #[must_use]
    #[inline]
    pub fn display_name(&self) -> &str {
        self.subtype
            .as_deref()
            .unwrap_or_else(|| self.base.display_name())
    }
}

impl From<Kind> for ObjectKind {
    #[inline]
    fn from(base: Kind) -> Self {
        Self {
            base,
            subtype: None,
        }
    }
}

/// The outcome of reading an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    /// The value the attribute was declared with
    Literal(Value),
    /// A symbolic reference to be resolved by Terraform
    Reference(Reference),
}

impl Attr {
    /// Convert into a JSON value usable as another object's attribute
    #[must_use]
    #[inline]
    pub fn into_value(self) -> Value {
        match self {
            Self::Literal(value) => value,
            Self::Reference(reference) => reference.into(),
        }
    }

    /// The reference, if this read produced one
    #[must_use]
    #[inline]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match *self {
            Self::Reference(ref reference) => Some(reference),
            Self::Literal(_) => None,
        }
    }

    /// The literal, if this read produced one
    #[must_use]
    #[inline]
    pub const fn as_literal(&self) -> Option<&Value> {
        match *self {
            Self::Literal(ref value) => Some(value),
            Self::Reference(_) => None,
        }
    }
}

impl From<Attr> for Value {
    #[inline]
    fn from(attr: Attr) -> Self {
        attr.into_value()
    }
}

impl PartialEq<Value> for Attr {
    #[inline]
    fn eq(&self, other: &Value) -> bool {
        match *self {
            Self::Literal(ref value) => value == other,
            Self::Reference(ref reference) => other.as_str().is_some_and(|s| *reference == s),
        }
    }
}

impl PartialEq<&str> for Attr {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        match *self {
            Self::Literal(ref value) => value.as_str() == Some(*other),
            Self::Reference(ref reference) => reference == other,
        }
    }
}

#[derive(Debug)]
struct ObjectData {
    kind: ObjectKind,
    object_type: Option<String>,
    name: String,
    values: Attributes,
    /// Plain fields set on the object that are never emitted
    fields: HashMap<String, Value>,
    /// Output key for kinds whose names may legitimately repeat
    duplicate_key: Option<DuplicateKey>,
}

/// Shared handle to a declared object
#[derive(Clone)]
pub struct Object {
    data: Rc<RefCell<ObjectData>>,
    frozen: Rc<Cell<bool>>,
}

impl Object {
    pub(crate) fn new(
        kind: ObjectKind,
        object_type: Option<String>,
        name: String,
        values: Attributes,
        duplicate_key: Option<DuplicateKey>,
        frozen: Rc<Cell<bool>>,
    ) -> Self {
        Self {
            data: Rc::new(RefCell::new(ObjectData {
                kind,
                object_type,
                name,
                values,
                fields: HashMap::new(),
                duplicate_key,
            })),
            frozen,
        }
    }

    /// The exact kind this object was declared as
    #[must_use]
    #[inline]
    pub fn kind(&self) -> ObjectKind {
        self.data.borrow().kind.clone()
    }

    /// Object name (empty for `terraform` settings)
    #[must_use]
    #[inline]
    pub fn name(&self) -> String {
        self.data.borrow().name.clone()
    }

    /// Object type for typed kinds (`aws_instance`, ...)
    #[must_use]
    #[inline]
    pub fn object_type(&self) -> Option<String> {
        self.data.borrow().object_type.clone()
    }

    /// Snapshot of the values that will be emitted
    #[must_use]
    #[inline]
    pub fn values(&self) -> Attributes {
        self.data.borrow().values.clone()
    }

    /// Address used as the prefix of references to this object, if it has one
    ///
    /// `type.name` for resources, `data.type.name` for data sources and
    /// `module.name` for modules.
    #[must_use]
    #[inline]
    pub fn terraform_name(&self) -> Option<String> {
        let data = self.data.borrow();
        match (data.kind.base(), data.object_type.as_deref()) {
            (Kind::Resource, Some(object_type)) => Some(format!("{object_type}.{}", data.name)),
            (Kind::Data, Some(object_type)) => Some(format!("data.{object_type}.{}", data.name)),
            (Kind::Module, _) => Some(format!("module.{}", data.name)),
            _ => None,
        }
    }

    /// Read an attribute
    ///
    /// Plain fields are returned as set. Declared values are returned
    /// literally until the registry is frozen; after that, and for attributes
    /// that were never declared, kinds with an address produce a [`Reference`].
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The attribute must become a reference and this kind cannot produce one
    #[inline]
    pub fn get(&self, attribute: &str) -> DeclareResult<Attr> {
        {
            let data = self.data.borrow();
            if let Some(value) = data.fields.get(attribute) {
                return Ok(Attr::Literal(value.clone()));
            }
            if !self.frozen.get()
                && let Some(value) = data.values.get(attribute)
            {
                return Ok(Attr::Literal(value.clone()));
            }
        }
        self.reference(attribute).map(Attr::Reference)
    }

    /// Reference form of an attribute regardless of whether it is known
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - This kind cannot produce references (variables, outputs, providers)
    #[inline]
    pub fn reference(&self, attribute: &str) -> DeclareResult<Reference> {
        self.terraform_name()
            .map(|target| Reference::new(target, attribute))
            .ok_or_else(|| DeclareError::Interpolation {
                kind: self.data.borrow().kind.display_name().to_owned(),
                attribute: attribute.to_owned(),
            })
    }

    /// Read an attribute as if the registry were frozen
    ///
    /// Use this when a known value should still be written as a reference so
    /// that Terraform records the dependency between the two objects.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - This kind cannot produce references
    #[inline]
    pub fn interpolated(&self, attribute: &str) -> DeclareResult<Attr> {
        let _frozen = FrozenGuard::engage(&self.frozen);
        self.get(attribute)
    }

    /// Write an attribute
    ///
    /// Names already present in the declared values update them; any other
    /// name is kept as a plain field that is readable but never emitted.
    #[inline]
    pub fn set<V: Into<Value>>(&self, attribute: &str, value: V) {
        let mut data = self.data.borrow_mut();
        let value = value.into();
        if let Some(slot) = data.values.get_mut(attribute) {
            *slot = value;
        } else {
            data.fields.insert(attribute.to_owned(), value);
        }
    }

    /// Build this object's output fragment
    #[must_use]
    #[inline]
    pub fn build(&self) -> Block {
        let data = self.data.borrow();
        let category = data.kind.category();
        let values = Value::Object(data.values.clone());

        let body = match (data.kind.base().identity(), data.object_type.as_deref()) {
            (Identity::Settings, _) => return Block::new().with(category, values),
            (Identity::Typed, Some(object_type)) => {
                Block::new().with(object_type, Block::new().with(data.name.as_str(), values))
            }
            _ => match data.duplicate_key.clone() {
                Some(key) => Block::new().with(key, values),
                None => Block::new().with(data.name.as_str(), values),
            },
        };
        Block::new().with(category, body)
    }
}

impl PartialEq for Object {
    /// Same exact kind, type, name and declared values. Plain fields are ignored.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if Rc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        let (a, b) = (self.data.borrow(), other.data.borrow());
        a.kind == b.kind && a.object_type == b.object_type && a.name == b.name && a.values == b.values
    }
}

impl fmt::Debug for Object {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        f.debug_struct("Object")
            .field("kind", &data.kind)
            .field("object_type", &data.object_type)
            .field("name", &data.name)
            .field("values", &data.values)
            .finish()
    }
}

impl fmt::Display for Object {
    /// Variables render as their interpolation (`${var.name}`) so they can be
    /// embedded in other values; every other kind renders descriptively.
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.borrow();
        match (data.kind.base(), data.object_type.as_deref()) {
            (Kind::Variable, _) => write!(f, "${{var.{}}}", data.name),
            (Kind::Terraform, _) => f.write_str("terraform"),
            (_, Some(object_type)) => write!(f, "{} {object_type}.{}", data.kind.category(), data.name),
            (_, None) => write!(f, "{} {}", data.kind.category(), data.name),
        }
    }
}

/// Forces the frozen flag on and restores the previous state when dropped
struct FrozenGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> FrozenGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for FrozenGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}
