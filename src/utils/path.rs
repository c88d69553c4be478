//! Path helpers for file references inside Terraform values

use core::panic::Location;
use std::path::{Component, Path, PathBuf};

/// Normalize a path by resolving `.` and `..` components
#[must_use]
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Leading '..' components are kept
                if matches!(components.last(), None | Some(Component::ParentDir)) {
                    components.push(component);
                } else {
                    components.pop();
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
        }
    }

    components.iter().collect()
}

/// Convert backslashes to forward slashes
#[must_use]
#[inline]
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// `${path.module}`-based path for `name`, relative to the directory of `source_file`
///
/// `source_file` is a path as reported by [`Location::file`], relative to the
/// directory the build ran in.
#[must_use]
#[inline]
pub fn relative_path_from(source_file: &str, name: &str) -> String {
    let directory = Path::new(source_file).parent().unwrap_or_else(|| Path::new(""));
    let joined = normalize_path(&directory.join(name));
    format!(
        "${{path.module}}/{}",
        normalize_separators(&joined.to_string_lossy())
    )
}

/// Terraform `file()` expression for `name` relative to the caller's source file
#[must_use]
#[inline]
pub fn relative_file_from(caller: &Location<'_>, name: &str) -> String {
    format!("${{file(\"{}\")}}", relative_path_from(caller.file(), name))
}

/// `${path.module}`-based path for `name`, relative to the calling source file
#[track_caller]
#[must_use]
#[inline]
pub fn relative_path(name: &str) -> String {
    relative_path_from(Location::caller().file(), name)
}

/// Terraform `file()` expression for `name`, relative to the calling source file
///
/// `path.module` points at the directory holding the written document, so
/// files that live next to the code declaring them need this indirection.
#[track_caller]
#[must_use]
#[inline]
pub fn relative_file(name: &str) -> String {
    relative_file_from(Location::caller(), name)
}
