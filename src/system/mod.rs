//! System abstraction for filesystem operations
//!
//! Everything the command line touches on disk goes through [`System`], so
//! discovery and loading can be tested against an in-memory filesystem.

use std::io;
use std::path::{Path, PathBuf};

pub mod mock;
pub mod real;

pub use mock::MockSystem;
pub use real::RealSystem;

/// Entry from directory walking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_file: bool,
    pub is_dir: bool,
}

/// Unified trait for filesystem operations
///
/// # Implementations
/// - `RealSystem`: Production implementation using `std::fs` and `walkdir`
/// - `MockSystem`: Test implementation using in-memory storage
pub trait System: Send + Sync {
    /// Get the current working directory
    fn current_dir(&self) -> io::Result<PathBuf>;

    /// Read entire file contents as a string
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write bytes to a file, creating it if it doesn't exist
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Recursively create a directory and all parent directories
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path points to a file
    fn is_file(&self, path: &Path) -> bool;

    /// Check if a path points to a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Read directory entries, returning paths of all direct children
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Recursively walk a directory
    ///
    /// Returns every entry below `path` (the root itself excluded), sorted by path.
    fn walk_dir(&self, path: &Path, follow_links: bool) -> io::Result<Vec<WalkEntry>>;
}
