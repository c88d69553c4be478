//! `tfdeclare` - Declare Terraform configuration as objects and compile it
//!
//! Objects (providers, variables, outputs, modules, data sources, resources)
//! are declared on a [`Registry`], either from Rust code or from YAML
//! declaration files. [`Registry::compile`] folds them into one document in
//! Terraform's JSON syntax, with sorted keys and intentionally duplicated
//! provider keys preserved.
//!
//! ```
//! use serde_json::json;
//! use tfdeclare::Registry;
//!
//! let registry = Registry::new();
//! let sg = registry
//!     .resource("aws_security_group", "sg", json!({"name": "sg"}))
//!     .unwrap();
//! registry
//!     .resource("aws_instance", "web", json!({"security_groups": [sg.reference("id").unwrap()]}))
//!     .unwrap();
//!
//! let document = registry.compile().unwrap();
//! assert_eq!(
//!     document.to_value()["resource"]["aws_instance"]["web"]["security_groups"],
//!     json!(["${aws_security_group.sg.id}"])
//! );
//! ```

pub mod cli;
pub mod collections;
pub mod config;
pub mod document;
pub mod error;
pub mod hooks;
pub mod objects;
pub mod operations;
pub mod registry;
pub mod system;
pub mod utils;

pub use collections::{Collection, Field, FieldType, Inputs, ResourceCollection, Schema};
pub use document::{Block, Document, Key, Node};
pub use error::{DeclareError, DeclareResult};
pub use objects::{Attr, Attributes, DuplicateKey, Kind, Object, ObjectKind, Reference};
pub use registry::{Registry, Variant};
pub use utils::path::{relative_file, relative_path};

use anyhow::Result;
use cli::Args;
use operations::{CompileOperation, CompileSummary};
use system::System;

/// Main entry point for the tfdeclare command line
///
/// # Errors
///
/// Returns an error if:
/// - The arguments are invalid
/// - Any step of the compile operation fails
#[inline]
pub fn run(args: &Args, system: &dyn System) -> Result<CompileSummary> {
    let operation = CompileOperation::new(args, system)?;
    operation.execute()
}
