//! Object registry and compiler
//!
//! The [`Registry`] records every object declared through it, in declaration
//! order per exact kind, and folds them into one [`Document`] on
//! [`Registry::compile`]. It also owns the declaration contexts (variants,
//! provider selections), the hook table and the duplicate-key allocator.
//!
//! Declaration is single-threaded: the registry is neither `Send` nor `Sync`.

pub mod context;
pub mod hooks;

pub use context::{ProviderScope, ProviderSelection, Variant, VariantScope, resolve_variant_values};
pub use hooks::Hooks;

use crate::collections::{Collection, Finalize, ResourceCollection, resolve_inputs, type_label};
use crate::document::{Document, Node};
use crate::error::{DeclareError, DeclareResult};
use crate::objects::{Attributes, DuplicateKeys, Identity, Kind, Object, ObjectKind};
use core::cell::{Cell, RefCell};
use serde_json::Value;
use std::rc::Rc;
use tracing::{debug, info};

/// Tracks declared objects and compiles them into a document
#[derive(Default)]
pub struct Registry {
    frozen: Rc<Cell<bool>>,
    instances: RefCell<Vec<(ObjectKind, Vec<Object>)>>,
    collections: RefCell<Vec<Rc<dyn Finalize>>>,
    hooks: RefCell<Hooks>,
    duplicate_keys: RefCell<DuplicateKeys>,
    pub(crate) variants: RefCell<Vec<Variant>>,
    pub(crate) providers: RefCell<Vec<ProviderSelection>>,
}

impl Registry {
    /// Create an empty registry
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Lifecycle ====================

    /// Record `object` under its exact kind
    pub(crate) fn register(&self, object: Object) {
        let kind = object.kind();
        let mut instances = self.instances.borrow_mut();
        match instances.iter().position(|entry| entry.0 == kind) {
            Some(index) => instances[index].1.push(object),
            None => instances.push((kind, vec![object])),
        }
    }

    /// Forget every object, collection, hook and duplicate-key slot, and unfreeze
    ///
    /// Active variant and provider scopes are left to their guards.
    #[inline]
    pub fn reset(&self) {
        self.instances.borrow_mut().clear();
        self.collections.borrow_mut().clear();
        self.hooks.borrow_mut().clear();
        self.duplicate_keys.borrow_mut().clear();
        self.frozen.set(false);
        debug!("Registry reset");
    }

    /// Whether attribute reads currently prefer references
    #[must_use]
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Switch attribute reads to reference form until [`Registry::reset`]
    #[inline]
    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    /// Objects registered under exactly `kind`, in declaration order
    #[must_use]
    #[inline]
    pub fn instances<K: Into<ObjectKind>>(&self, kind: K) -> Vec<Object> {
        let kind = kind.into();
        self.instances
            .borrow()
            .iter()
            .find(|entry| entry.0 == kind)
            .map(|entry| entry.1.clone())
            .unwrap_or_default()
    }

    /// Number of registered objects across all kinds
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.borrow().iter().map(|entry| entry.1.len()).sum()
    }

    /// Whether nothing has been declared
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fold every declared object into one document
    ///
    /// Freezes the registry, runs collection finalizers newest first, then
    /// builds each object kind by kind (base kind before its subtypes),
    /// applies hooks and merges the fragments. Each collection is finalized
    /// once; compiling again rebuilds the document from the same objects.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A collection finalizer fails
    /// - A hook fails
    #[inline]
    pub fn compile(&self) -> DeclareResult<Document> {
        self.frozen.set(true);

        let collections: Vec<_> = self.collections.borrow().clone();
        for collection in collections.iter().rev() {
            collection.finalize(self)?;
        }

        let hooks = self.hooks.borrow().clone();
        let mut document = Document::new();
        let mut built = 0_usize;

        for kind in Kind::ALL {
            for object in self.objects_of(kind) {
                let mut fragment = object.build();
                hooks.apply(&mut fragment)?;
                document.merge(fragment);
                built += 1;
            }
        }

        info!("Compiled {built} objects from {} collections", collections.len());
        Ok(document)
    }

    /// Objects of `base` and of every subtype of it, base first
    fn objects_of(&self, base: Kind) -> Vec<Object> {
        let instances = self.instances.borrow();
        let mut ordered: Vec<&(ObjectKind, Vec<Object>)> = instances
            .iter()
            .filter(|entry| entry.0.base() == base)
            .collect();
        ordered.sort_by_key(|entry| entry.0.subtype_name().is_some());
        ordered
            .into_iter()
            .flat_map(|entry| entry.1.iter().cloned())
            .collect()
    }

    // ==================== Declaration ====================

    /// Declare the `terraform` settings block
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `values` is not a mapping
    #[inline]
    pub fn terraform(&self, values: Value) -> DeclareResult<Object> {
        let values = into_attributes(values)?;
        let object = Object::new(
            Kind::Terraform.into(),
            None,
            String::new(),
            values,
            None,
            Rc::clone(&self.frozen),
        );
        self.register(object.clone());
        Ok(object)
    }

    /// Declare a provider configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `values` is not a mapping
    #[inline]
    pub fn provider(&self, name: &str, values: Value) -> DeclareResult<Object> {
        self.declare_named(Kind::Provider, name, values)
    }

    /// Declare an input variable
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `values` is not a mapping
    #[inline]
    pub fn variable(&self, name: &str, values: Value) -> DeclareResult<Object> {
        self.declare_named(Kind::Variable, name, values)
    }

    /// Declare an output
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `values` is not a mapping
    #[inline]
    pub fn output(&self, name: &str, values: Value) -> DeclareResult<Object> {
        self.declare_named(Kind::Output, name, values)
    }

    /// Declare a module call
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `values` is not a mapping
    #[inline]
    pub fn module(&self, name: &str, values: Value) -> DeclareResult<Object> {
        self.declare_named(Kind::Module, name, values)
    }

    /// Declare a data source
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `values` is not a mapping
    #[inline]
    pub fn data(&self, object_type: &str, name: &str, values: Value) -> DeclareResult<Object> {
        self.declare_typed(Kind::Data, object_type, name, values)
    }

    /// Declare a managed resource
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `values` is not a mapping
    #[inline]
    pub fn resource(&self, object_type: &str, name: &str, values: Value) -> DeclareResult<Object> {
        self.declare_typed(Kind::Resource, object_type, name, values)
    }

    /// Declare an object of a named kind (or a subtype of one)
    ///
    /// `<variant>_variant` keywords are resolved against the active variant.
    /// Providers get a duplicate-key slot so that same-named providers with
    /// different aliases all survive compilation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `kind` is not a named kind
    /// - `values` is not a mapping
    #[inline]
    pub fn declare_named<K: Into<ObjectKind>>(
        &self,
        kind: K,
        name: &str,
        values: Value,
    ) -> DeclareResult<Object> {
        let kind = kind.into();
        expect_identity(&kind, Identity::Named)?;

        let values = resolve_variant_values(into_attributes(values)?, self.current_variant().as_ref());
        let duplicate_key =
            (kind.base() == Kind::Provider).then(|| self.duplicate_keys.borrow_mut().allocate(name));

        debug!("Declaring {} '{name}'", kind.display_name());
        let object = Object::new(
            kind,
            None,
            name.to_owned(),
            values,
            duplicate_key,
            Rc::clone(&self.frozen),
        );
        self.register(object.clone());
        Ok(object)
    }

    /// Declare an object of a typed kind (or a subtype of one)
    ///
    /// Besides variant resolution, the innermost selected provider is injected
    /// as the `provider` attribute when its name prefixes `object_type`,
    /// unless the declaration already sets one.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `kind` is not a typed kind
    /// - `values` is not a mapping
    #[inline]
    pub fn declare_typed<K: Into<ObjectKind>>(
        &self,
        kind: K,
        object_type: &str,
        name: &str,
        values: Value,
    ) -> DeclareResult<Object> {
        let kind = kind.into();
        expect_identity(&kind, Identity::Typed)?;

        let mut values = resolve_variant_values(into_attributes(values)?, self.current_variant().as_ref());
        if let Some(provider) = self.current_provider()
            && provider.serves(object_type)
            && !values.contains_key("provider")
        {
            values.insert("provider".to_owned(), Value::String(provider.as_provider()));
        }

        debug!("Declaring {} '{object_type}.{name}'", kind.display_name());
        let object = Object::new(
            kind,
            Some(object_type.to_owned()),
            name.to_owned(),
            values,
            None,
            Rc::clone(&self.frozen),
        );
        self.register(object.clone());
        Ok(object)
    }

    /// Declare a resource collection: resolve its inputs, run
    /// `create_resources` once and keep it for finalization at compile time
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `arguments` is not a mapping or names an unknown input
    /// - A required input is missing or an input fails validation
    /// - `create_resources` fails
    #[inline]
    pub fn collection<T: ResourceCollection>(
        &self,
        collection: T,
        arguments: Value,
    ) -> DeclareResult<Collection<T>> {
        let name = type_label::<T>();
        let inputs = resolve_inputs(
            name,
            &T::schema(),
            into_attributes(arguments)?,
            self.current_variant().as_ref(),
        )?;

        debug!("Creating resources for collection {name}");
        let handle = Collection::new(collection, inputs);

        // Recorded before its children so they finalize first
        let slot = {
            let mut collections = self.collections.borrow_mut();
            collections.push(Rc::new(handle.clone()));
            collections.len() - 1
        };
        let created = handle.borrow_mut().create_resources(handle.inputs(), self);
        if let Err(err) = created {
            let mut collections = self.collections.borrow_mut();
            if slot < collections.len() {
                collections.remove(slot);
            }
            return Err(err);
        }
        Ok(handle)
    }

    // ==================== Contexts ====================

    /// Activate `variant` until the returned scope is dropped
    ///
    /// Variants nest; the innermost one is the active one.
    #[inline]
    pub fn enter_variant(&self, variant: Variant) -> VariantScope<'_> {
        debug!("Entering variant '{}'", variant.name());
        let depth = {
            let mut variants = self.variants.borrow_mut();
            variants.push(variant);
            variants.len()
        };
        VariantScope::new(self, depth)
    }

    /// The innermost active variant
    #[must_use]
    #[inline]
    pub fn current_variant(&self) -> Option<Variant> {
        self.variants.borrow().last().cloned()
    }

    /// Select `provider` for typed declarations until the returned scope is dropped
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `provider` is not a provider
    /// - `provider` has no non-empty `alias`
    #[inline]
    pub fn enter_provider(&self, provider: &Object) -> DeclareResult<ProviderScope<'_>> {
        let kind = provider.kind();
        if kind.base() != Kind::Provider {
            return Err(DeclareError::programmer(format!(
                "Only providers can be entered as a provider context, not {}",
                kind.display_name()
            )));
        }

        let alias = match provider.values().get("alias") {
            Some(&Value::String(ref alias)) if !alias.is_empty() => alias.clone(),
            _ => {
                return Err(DeclareError::configuration(format!(
                    "Providers must have an alias to be used as a context: '{}'",
                    provider.name()
                )));
            }
        };

        let selection = ProviderSelection::new(provider.name(), alias);
        debug!("Entering provider '{}'", selection.as_provider());
        let depth = {
            let mut providers = self.providers.borrow_mut();
            providers.push(selection);
            providers.len()
        };
        Ok(ProviderScope::new(self, depth))
    }

    /// The innermost selected provider
    #[must_use]
    #[inline]
    pub fn current_provider(&self) -> Option<ProviderSelection> {
        self.providers.borrow().last().cloned()
    }

    // ==================== Hooks ====================

    /// Run `hook` on the `category` part of every built fragment that has one
    #[inline]
    pub fn add_hook<F>(&self, category: &str, hook: F)
    where
        F: Fn(Node) -> DeclareResult<Node> + 'static,
    {
        debug!("Adding hook for '{category}'");
        self.hooks.borrow_mut().add(category, hook);
    }

    /// Run `hook` on the values of every `kind` object called `name`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `kind` is not a named kind
    #[inline]
    pub fn add_named_hook<F>(&self, kind: Kind, name: &str, hook: F) -> DeclareResult<()>
    where
        F: Fn(Node) -> DeclareResult<Node> + 'static,
    {
        let wrapped = hooks::named_hook(kind, name, hook)?;
        self.add_hook(kind.category(), wrapped);
        Ok(())
    }

    /// Run `hook` on the attributes of every `kind` object of `object_type`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `kind` is not a typed kind
    #[inline]
    pub fn add_typed_hook<F>(&self, kind: Kind, object_type: &str, hook: F) -> DeclareResult<()>
    where
        F: Fn(&str, Attributes) -> DeclareResult<Attributes> + 'static,
    {
        let wrapped = hooks::typed_hook(kind, object_type, hook)?;
        self.add_hook(kind.category(), wrapped);
        Ok(())
    }
}

/// Accept a JSON mapping (or null) as declaration keywords
fn into_attributes(values: Value) -> DeclareResult<Attributes> {
    match values {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Attributes::new()),
        Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_) => {
            Err(DeclareError::configuration(format!(
                "Declaration attributes must be a mapping, got: {values}"
            )))
        }
    }
}

fn expect_identity(kind: &ObjectKind, identity: Identity) -> DeclareResult<()> {
    if kind.base().identity() == identity {
        return Ok(());
    }
    Err(DeclareError::programmer(format!(
        "{} objects cannot be declared as {identity:?}",
        kind.display_name()
    )))
}

#[cfg(test)]
#[expect(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_groups_by_exact_kind() {
        let registry = Registry::new();
        let custom = ObjectKind::subtype(Kind::Resource, "TestResource").unwrap();
        registry.declare_typed(custom.clone(), "res1", "foo", json!({})).unwrap();
        registry.resource("res1", "bar", json!({})).unwrap();

        assert_eq!(registry.instances(Kind::Resource).len(), 1);
        assert_eq!(registry.instances(custom).len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn base_kind_objects_compile_before_subtypes() {
        let registry = Registry::new();
        let custom = ObjectKind::subtype(Kind::Output, "Special").unwrap();
        registry.declare_named(custom, "a", json!({"value": "subtype"})).unwrap();
        registry.output("a", json!({"value": "base"})).unwrap();

        let ordered = registry.objects_of(Kind::Output);
        assert_eq!(ordered[0].values()["value"], json!("base"));
        assert_eq!(ordered[1].values()["value"], json!("subtype"));
    }

    #[test]
    fn wrong_identity_is_a_programmer_error() {
        let registry = Registry::new();
        let err = registry.declare_named(Kind::Resource, "x", json!({})).unwrap_err();
        assert!(matches!(err, DeclareError::Programmer { .. }));
        let err = registry.declare_typed(Kind::Variable, "t", "x", json!({})).unwrap_err();
        assert!(matches!(err, DeclareError::Programmer { .. }));
    }

    #[test]
    fn non_mapping_attributes_are_rejected() {
        let registry = Registry::new();
        let err = registry.variable("x", json!([1, 2])).unwrap_err();
        assert!(matches!(err, DeclareError::Configuration { .. }));
        assert!(registry.variable("y", Value::Null).is_ok());
    }

    #[test]
    fn type_labels_drop_the_module_path() {
        assert_eq!(type_label::<Registry>(), "Registry");
    }
}
