//! Scoped declaration contexts
//!
//! Variants select per-environment overrides; provider selections attach a
//! `provider = "name.alias"` attribute to matching typed objects. Both are
//! stacks owned by the registry and entered through guards that unwind the
//! stack to their own entry on drop, so the previous context comes back on
//! every exit path.

use super::Registry;
use crate::objects::Attributes;
use serde_json::Value;
use tracing::debug;

/// Suffix marking per-variant override keywords (`prod_variant`)
pub const VARIANT_SUFFIX: &str = "_variant";

/// A named environment profile
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variant {
    name: String,
    defaults: Attributes,
}

impl Variant {
    /// Create a variant without defaults
    #[must_use]
    #[inline]
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            defaults: Attributes::new(),
        }
    }

    /// Add a default that collections fall back to for the input `name`
    #[must_use]
    #[inline]
    pub fn with_default<V: Into<Value>>(mut self, name: &str, value: V) -> Self {
        self.defaults.insert(name.to_owned(), value.into());
        self
    }

    /// Variant name
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All declared defaults
    #[must_use]
    #[inline]
    pub const fn defaults(&self) -> &Attributes {
        &self.defaults
    }

    /// Default for one input
    #[must_use]
    #[inline]
    pub fn default_for(&self, name: &str) -> Option<&Value> {
        self.defaults.get(name)
    }

    /// Keyword that carries this variant's overrides (`<name>_variant`)
    #[must_use]
    #[inline]
    pub fn override_key(&self) -> String {
        format!("{}{VARIANT_SUFFIX}", self.name)
    }
}

/// A provider configuration selected for implicit injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSelection {
    name: String,
    alias: String,
}

impl ProviderSelection {
    pub(crate) const fn new(name: String, alias: String) -> Self {
        Self { name, alias }
    }

    /// Provider name (`aws`)
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Provider alias (`west2`)
    #[must_use]
    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Value of the `provider` attribute (`aws.west2`)
    #[must_use]
    #[inline]
    pub fn as_provider(&self) -> String {
        format!("{}.{}", self.name, self.alias)
    }

    /// Whether this provider serves objects of `object_type`
    ///
    /// Terraform types are prefixed with their provider name (`aws_instance`).
    #[must_use]
    #[inline]
    pub fn serves(&self, object_type: &str) -> bool {
        object_type.split('_').next() == Some(self.name.as_str())
    }
}

/// Keeps a variant active until dropped
#[must_use = "the variant is deactivated as soon as the scope is dropped"]
pub struct VariantScope<'r> {
    registry: &'r Registry,
    depth: usize,
}

impl<'r> VariantScope<'r> {
    /// `depth` is the stack length right after this scope's variant was pushed
    pub(crate) const fn new(registry: &'r Registry, depth: usize) -> Self {
        Self { registry, depth }
    }
}

impl Drop for VariantScope<'_> {
    // Drops this scope's entry and anything entered after it, whatever the drop order
    #[inline]
    fn drop(&mut self) {
        let mut variants = self.registry.variants.borrow_mut();
        if variants.len() >= self.depth {
            for variant in variants.drain(self.depth - 1..) {
                debug!("Leaving variant '{}'", variant.name());
            }
        }
    }
}

/// Keeps a provider selected until dropped
#[must_use = "the provider is deselected as soon as the scope is dropped"]
pub struct ProviderScope<'r> {
    registry: &'r Registry,
    depth: usize,
}

impl<'r> ProviderScope<'r> {
    /// `depth` is the stack length right after this scope's provider was pushed
    pub(crate) const fn new(registry: &'r Registry, depth: usize) -> Self {
        Self { registry, depth }
    }
}

impl Drop for ProviderScope<'_> {
    #[inline]
    fn drop(&mut self) {
        let mut providers = self.registry.providers.borrow_mut();
        if providers.len() >= self.depth {
            for provider in providers.drain(self.depth - 1..) {
                debug!("Leaving provider '{}'", provider.as_provider());
            }
        }
    }
}

/// Apply variant overrides to the keywords of an object declaration
///
/// Plain keywords are kept; the active variant's `<name>_variant` mapping is
/// merged over them; every other `*_variant` keyword is dropped.
#[must_use]
#[inline]
pub fn resolve_variant_values(keywords: Attributes, variant: Option<&Variant>) -> Attributes {
    let active_key = variant.map(Variant::override_key);
    let mut values = Attributes::new();
    let mut overrides = None;

    for (key, value) in keywords {
        if !key.ends_with(VARIANT_SUFFIX) {
            values.insert(key, value);
        } else if active_key.as_deref() == Some(key.as_str()) {
            overrides = Some(value);
        } else {
            debug!("Dropping inactive variant keyword '{key}'");
        }
    }

    match overrides {
        Some(Value::Object(overrides)) => values.extend(overrides),
        Some(other) => {
            // A non-mapping override cannot be merged key by key
            debug!("Ignoring non-mapping variant override: {other}");
        }
        None => {}
    }

    values
}
