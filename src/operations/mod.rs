//! Operations module
//!
//! Coordinates the command-line pipeline: discovering declaration files,
//! declaring their objects and compiling the document

pub mod compile;
pub mod declare;
pub mod discovery;

pub use compile::{CompileOperation, CompileSummary};
pub use declare::declare_file;
pub use discovery::{discover_declaration_files, is_declaration_file};
