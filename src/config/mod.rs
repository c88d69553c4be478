//! Declaration file configuration
//!
//! Handles YAML parsing, JSON schema validation and semantic checks of
//! declaration files.

pub mod declarations;
pub mod schema;
pub mod validation;
pub mod yaml;

pub use declarations::{DeclarationFile, NamedDeclaration, ProviderDeclaration, TypedDeclaration};
pub use yaml::{load_declarations, parse_declarations};
