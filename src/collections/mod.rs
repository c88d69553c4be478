//! Resource collections
//!
//! A collection is a reusable template that declares a group of lower-level
//! objects from a set of validated inputs. Declaring one through
//! [`Registry::collection`] resolves its inputs, runs
//! [`ResourceCollection::create_resources`] once, and keeps the instance so
//! that [`ResourceCollection::finalize_resources`] can run during compilation.

pub mod inputs;
pub mod schema;

pub use inputs::{Inputs, resolve_inputs};
pub use schema::{Field, FieldType, Schema};

use crate::error::DeclareResult;
use crate::registry::Registry;
use crate::utils::path;
use core::any;
use core::cell::{Cell, Ref, RefCell, RefMut};
use core::panic::Location;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::rc::Rc;

/// A user-defined group of declared objects
pub trait ResourceCollection: 'static {
    /// Inputs accepted by this collection
    fn schema() -> Schema
    where
        Self: Sized;

    /// Declare this collection's objects
    ///
    /// # Errors
    ///
    /// Returns an error if any declaration fails
    fn create_resources(&mut self, inputs: &Inputs, registry: &Registry) -> DeclareResult<()>;

    /// Runs during compilation once every collection exists, newest collection first
    ///
    /// A collection nested inside another one's `create_resources` counts as
    /// newer than its parent. Each instance is finalized at most once.
    ///
    /// # Errors
    ///
    /// Returns an error if any declaration fails
    #[inline]
    fn finalize_resources(&mut self, _inputs: &Inputs, _registry: &Registry) -> DeclareResult<()> {
        Ok(())
    }

    /// Terraform `file()` expression for `name`, relative to the calling source file
    #[track_caller]
    #[inline]
    fn relative_file(&self, name: &str) -> String {
        path::relative_file_from(Location::caller(), name)
    }
}

/// Shared handle to a declared collection and its resolved inputs
///
/// Serializes as its resolved inputs, so a handle can be passed as the value
/// of a [`FieldType::Collection`] input.
pub struct Collection<T> {
    inner: Rc<RefCell<T>>,
    inputs: Rc<Inputs>,
    finalized: Rc<Cell<bool>>,
}

impl<T> Clone for Collection<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            inputs: Rc::clone(&self.inputs),
            finalized: Rc::clone(&self.finalized),
        }
    }
}

impl<T> Serialize for Collection<T> {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.inputs.serialize(serializer)
    }
}

impl<T: ResourceCollection> Collection<T> {
    pub(crate) fn new(collection: T, inputs: Inputs) -> Self {
        Self {
            inner: Rc::new(RefCell::new(collection)),
            inputs: Rc::new(inputs),
            finalized: Rc::new(Cell::new(false)),
        }
    }

    /// Resolved inputs
    #[must_use]
    #[inline]
    pub fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// Resolved value of one input
    #[must_use]
    #[inline]
    pub fn input(&self, name: &str) -> Option<&Value> {
        self.inputs.get(name)
    }

    /// Borrow the collection state
    ///
    /// # Panics
    ///
    /// Panics if the collection is currently borrowed mutably, e.g. from
    /// inside its own `create_resources`.
    #[must_use]
    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.inner.borrow()
    }

    /// Mutably borrow the collection state
    ///
    /// # Panics
    ///
    /// Panics if the collection is currently borrowed.
    #[must_use]
    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.inner.borrow_mut()
    }
}

/// Type-erased finalization entry kept by the registry
pub(crate) trait Finalize {
    fn finalize(&self, registry: &Registry) -> DeclareResult<()>;
}

impl<T: ResourceCollection> Finalize for Collection<T> {
    fn finalize(&self, registry: &Registry) -> DeclareResult<()> {
        if self.finalized.replace(true) {
            return Ok(());
        }
        self.inner
            .borrow_mut()
            .finalize_resources(&self.inputs, registry)
    }
}

/// Last path segment of `T`'s type name, used in messages
pub(crate) fn type_label<T>() -> &'static str {
    let full = any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
