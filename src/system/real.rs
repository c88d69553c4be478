//! Real system implementation using `std::fs` and `walkdir`

use super::{System, WalkEntry};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Production implementation of System trait
#[derive(Debug, Clone, Copy, Default)]
pub struct RealSystem;

impl RealSystem {
    /// Create a new `RealSystem` instance
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self
    }
}

impl System for RealSystem {
    #[inline]
    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents)
    }

    #[inline]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    #[inline]
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect()
    }

    #[inline]
    fn walk_dir(&self, path: &Path, follow_links: bool) -> io::Result<Vec<WalkEntry>> {
        WalkDir::new(path)
            .min_depth(1)
            .follow_links(follow_links)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                let entry = entry.map_err(io::Error::from)?;
                let file_type = entry.file_type();
                Ok(WalkEntry {
                    path: entry.into_path(),
                    is_file: file_type.is_file(),
                    is_dir: file_type.is_dir(),
                })
            })
            .collect()
    }
}
