//! Post-build hooks
//!
//! A hook is registered against a category key and rewrites the part of an
//! object's built fragment stored under that key, right after the object is
//! built and before it is merged into the document.

use crate::document::{Block, Key, Node};
use crate::error::{DeclareError, DeclareResult};
use crate::objects::{Attributes, Identity, Kind};
use core::mem;
use serde_json::Value;
use std::rc::Rc;
use tracing::debug;

/// Signature of a category hook
pub type HookFn = dyn Fn(Node) -> DeclareResult<Node>;

/// Ordered hook registrations
#[derive(Clone, Default)]
pub struct Hooks {
    entries: Vec<(String, Rc<HookFn>)>,
}

impl Hooks {
    /// Create an empty hook table
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for fragments containing `category`
    #[inline]
    pub fn add<F>(&mut self, category: &str, hook: F)
    where
        F: Fn(Node) -> DeclareResult<Node> + 'static,
    {
        self.entries.push((category.to_owned(), Rc::new(hook)));
    }

    /// Number of registrations
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no hook is registered
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every registration
    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Run every matching hook, in registration order, over `fragment`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A hook fails
    #[inline]
    pub fn apply(&self, fragment: &mut Block) -> DeclareResult<()> {
        for &(ref category, ref hook) in &self.entries {
            if let Some(node) = fragment.get_mut(&Key::from(category.as_str())) {
                debug!("Running hook for '{category}'");
                let given = mem::replace(node, Node::Value(Value::Null));
                *node = hook(given)?;
            }
        }
        Ok(())
    }
}

/// Wrap a per-name hook into a category hook for a named kind
///
/// The hook sees the values of every entry called `name`, duplicate-key
/// entries included.
///
/// # Errors
///
/// Returns an error if:
/// - `kind` is not a named kind
#[inline]
pub fn named_hook<F>(kind: Kind, name: &str, hook: F) -> DeclareResult<impl Fn(Node) -> DeclareResult<Node> + 'static>
where
    F: Fn(Node) -> DeclareResult<Node> + 'static,
{
    if kind.identity() != Identity::Named {
        return Err(DeclareError::programmer(format!(
            "Named hooks require a named kind, {kind} is not one"
        )));
    }

    let name = name.to_owned();
    Ok(move |mut node: Node| {
        if let Some(block) = node.as_block_mut() {
            for entry in block.entries_named_mut(&name) {
                let given = mem::replace(entry, Node::Value(Value::Null));
                *entry = hook(given)?;
            }
        }
        Ok(node)
    })
}

/// Wrap a per-object hook into a category hook for a typed kind
///
/// The hook receives each object's name and attributes and returns the
/// replacement attributes.
///
/// # Errors
///
/// Returns an error if:
/// - `kind` is not a typed kind
#[inline]
pub fn typed_hook<F>(
    kind: Kind,
    object_type: &str,
    hook: F,
) -> DeclareResult<impl Fn(Node) -> DeclareResult<Node> + 'static>
where
    F: Fn(&str, Attributes) -> DeclareResult<Attributes> + 'static,
{
    if kind.identity() != Identity::Typed {
        return Err(DeclareError::programmer(format!(
            "Typed hooks require a typed kind, {kind} is not one"
        )));
    }

    let category = kind.category();
    let object_type = object_type.to_owned();
    Ok(move |mut node: Node| {
        let Some(objects) = node
            .as_block_mut()
            .and_then(|types| types.get_mut(&Key::from(object_type.as_str())))
            .and_then(Node::as_block_mut)
        else {
            return Ok(node);
        };

        for (name, entry) in objects.iter_mut() {
            let Node::Value(Value::Object(ref mut attrs)) = *entry else {
                return Err(DeclareError::hook(
                    category,
                    format!("{object_type}.{} did not build to a mapping", name.as_str()),
                ));
            };
            let given = mem::take(attrs);
            *attrs = hook(name.as_str(), given)?;
        }
        Ok(node)
    })
}
