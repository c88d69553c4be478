//! Mock system implementation for testing

#![expect(clippy::module_name_repetitions)]

use super::{System, WalkEntry};
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory implementation of System trait for testing
///
/// # Example
/// ```
/// use tfdeclare::system::{MockSystem, System};
/// use std::path::Path;
///
/// let system = MockSystem::new()
///     .with_file("/work/main.tf.yaml", b"variables: []").unwrap()
///     .with_dir("/work/modules").unwrap();
///
/// assert!(system.is_file(Path::new("/work/main.tf.yaml")));
/// assert!(system.is_dir(Path::new("/work/modules")));
/// ```
#[derive(Clone)]
pub struct MockSystem {
    state: Arc<RwLock<MockSystemState>>,
}

struct MockSystemState {
    current_dir: PathBuf,
    files: HashMap<PathBuf, Vec<u8>>,
    dirs: HashSet<PathBuf>,
}

impl MockSystem {
    /// Create a new `MockSystem` with only the root directory
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(MockSystemState {
                current_dir: PathBuf::from("/"),
                files: HashMap::new(),
                dirs: HashSet::from([PathBuf::from("/")]),
            })),
        }
    }

    /// Set the current working directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_current_dir<P: AsRef<Path>>(self, dir: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        Self::ensure_parent_dirs(&mut state.dirs, dir.as_ref());
        state.current_dir = dir.as_ref().to_path_buf();
        drop(state);
        Ok(self)
    }

    /// Add a file with contents (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_file<P: AsRef<Path>>(self, path: P, contents: &[u8]) -> io::Result<Self> {
        let path_buf = path.as_ref().to_path_buf();
        let mut state = self.write_state()?;
        if let Some(parent) = path_buf.parent() {
            Self::ensure_parent_dirs(&mut state.dirs, parent);
        }
        state.files.insert(path_buf, contents.to_vec());
        drop(state);
        Ok(self)
    }

    /// Add a directory (builder pattern)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The state lock is poisoned
    #[inline]
    pub fn with_dir<P: AsRef<Path>>(self, path: P) -> io::Result<Self> {
        let mut state = self.write_state()?;
        Self::ensure_parent_dirs(&mut state.dirs, path.as_ref());
        drop(state);
        Ok(self)
    }

    /// Contents of a file written to the mock filesystem
    #[must_use]
    #[inline]
    pub fn file_contents<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        let state = self.read_state().ok()?;
        let bytes = state.files.get(path.as_ref())?.clone();
        drop(state);
        String::from_utf8(bytes).ok()
    }

    fn read_state(&self) -> io::Result<RwLockReadGuard<'_, MockSystemState>> {
        self.state
            .read()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn write_state(&self) -> io::Result<RwLockWriteGuard<'_, MockSystemState>> {
        self.state
            .write()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn ensure_parent_dirs(dirs: &mut HashSet<PathBuf>, path: &Path) {
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    fn not_found(what: &str, path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{what} not found: {}", path.display()),
        )
    }
}

impl Default for MockSystem {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl System for MockSystem {
    #[inline]
    fn current_dir(&self) -> io::Result<PathBuf> {
        Ok(self.read_state()?.current_dir.clone())
    }

    #[inline]
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let state = self.read_state()?;
        let bytes = state
            .files
            .get(path)
            .ok_or_else(|| Self::not_found("File", path))?
            .clone();
        drop(state);
        String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {e}")))
    }

    #[inline]
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut state = self.write_state()?;

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !state.dirs.contains(parent)
        {
            return Err(Self::not_found("Parent directory", parent));
        }

        state.files.insert(path.to_path_buf(), contents.to_vec());
        drop(state);
        Ok(())
    }

    #[inline]
    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.write_state()?;
        Self::ensure_parent_dirs(&mut state.dirs, path);
        drop(state);
        Ok(())
    }

    #[inline]
    fn exists(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.files.contains_key(path) || state.dirs.contains(path))
    }

    #[inline]
    fn is_file(&self, path: &Path) -> bool {
        self.read_state()
            .is_ok_and(|state| state.files.contains_key(path))
    }

    #[inline]
    fn is_dir(&self, path: &Path) -> bool {
        self.read_state().is_ok_and(|state| state.dirs.contains(path))
    }

    #[inline]
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.read_state()?;
        if !state.dirs.contains(path) {
            return Err(Self::not_found("Directory", path));
        }

        let mut entries: Vec<PathBuf> = state
            .files
            .keys()
            .chain(state.dirs.iter())
            .filter(|entry| entry.parent() == Some(path) && entry.as_path() != path)
            .cloned()
            .collect();
        drop(state);

        entries.sort();
        Ok(entries)
    }

    #[inline]
    fn walk_dir(&self, path: &Path, _follow_links: bool) -> io::Result<Vec<WalkEntry>> {
        let state = self.read_state()?;
        if !state.dirs.contains(path) {
            return Err(Self::not_found("Directory", path));
        }

        let files = state
            .files
            .keys()
            .filter(|file| file.starts_with(path))
            .map(|file| WalkEntry {
                path: file.clone(),
                is_file: true,
                is_dir: false,
            });
        let dirs = state
            .dirs
            .iter()
            .filter(|dir| dir.starts_with(path) && dir.as_path() != path)
            .map(|dir| WalkEntry {
                path: dir.clone(),
                is_file: false,
                is_dir: true,
            });

        let mut entries: Vec<WalkEntry> = files.chain(dirs).collect();
        drop(state);

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }
}
