//! Discovery of declaration files in a directory
//!
//! Declaration files end in `.tf.yaml` or `.tf.yml`. They are returned sorted
//! by path so that declaration order, and with it the compiled output, does
//! not depend on directory listing order.

use crate::error::DeclareError;
use crate::system::System;
use anyhow::Result;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name suffixes recognised as declaration files
pub const DECLARATION_SUFFIXES: [&str; 2] = [".tf.yaml", ".tf.yml"];

/// Whether `path` names a declaration file
#[must_use]
#[inline]
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| {
            DECLARATION_SUFFIXES
                .iter()
                .any(|suffix| name.len() > suffix.len() && name.ends_with(suffix))
        })
}

/// Find every declaration file in `directory`
///
/// # Errors
///
/// Returns an error if:
/// - The directory does not exist or is not a directory
/// - The directory cannot be listed
/// - No declaration file is found
#[inline]
pub fn discover_declaration_files(
    system: &dyn System,
    directory: &Path,
    recursive: bool,
) -> Result<Vec<PathBuf>> {
    if !system.exists(directory) {
        return Err(DeclareError::filesystem(format!(
            "Directory does not exist: {}",
            directory.display()
        ))
        .into());
    }

    if !system.is_dir(directory) {
        return Err(DeclareError::filesystem(format!(
            "Path is not a directory: {}",
            directory.display()
        ))
        .into());
    }

    let listing_error =
        |e: io::Error| DeclareError::filesystem(format!("Failed to list {}: {e}", directory.display()));

    let mut files: Vec<PathBuf> = if recursive {
        system
            .walk_dir(directory, false)
            .map_err(listing_error)?
            .into_iter()
            .filter(|entry| entry.is_file)
            .map(|entry| entry.path)
            .collect()
    } else {
        system
            .read_dir(directory)
            .map_err(listing_error)?
            .into_iter()
            .filter(|path| system.is_file(path))
            .collect()
    };

    files.retain(|path| is_declaration_file(path));
    files.sort();

    if files.is_empty() {
        return Err(DeclareError::configuration(format!(
            "No declaration files (*.tf.yaml, *.tf.yml) found in {}",
            directory.display()
        ))
        .into());
    }

    debug!("Discovered {} declaration files in {}", files.len(), directory.display());
    Ok(files)
}
