//! Deciding whether a stylesheet's CSS output is stale.
//!
//! A stylesheet is stale when its output is missing, older than the source,
//! or older than any stylesheet reachable through its `@import` graph.

use crate::app::error::StylesheetError;
use crate::app::imports::{normalize, scan_imports};
use crate::app::models::Settings;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

fn mtime(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Returns true when `less_file` must be (re)compiled.
pub fn needs_update(settings: &Settings, less_file: &Path) -> Result<bool, StylesheetError> {
    let destination = settings.destination_for(less_file);
    let Ok(destination_mtime) = mtime(&destination) else {
        return Ok(true);
    };

    let source_mtime = mtime(less_file).map_err(|source| StylesheetError::Source {
        path: less_file.to_path_buf(),
        source,
    })?;
    if source_mtime > destination_mtime {
        return Ok(true);
    }

    if !settings.check_imports {
        return Ok(false);
    }
    let mut visited = HashSet::from([normalize(less_file)]);
    walk_imports(less_file, Some(destination_mtime), &mut visited)
}

/// Returns true when some import reachable from `less_file` is newer than
/// `destination`, or, without a destination, newer than the file importing it.
pub fn contains_updated_import(
    less_file: &Path,
    destination: Option<&Path>,
) -> Result<bool, StylesheetError> {
    let reference = destination
        .map(|path| {
            mtime(path).map_err(|source| StylesheetError::Source {
                path: path.to_path_buf(),
                source,
            })
        })
        .transpose()?;

    let mut visited = HashSet::from([normalize(less_file)]);
    walk_imports(less_file, reference, &mut visited)
}

/// Depth-first over the import graph. Each path is entered at most once.
fn walk_imports(
    less_file: &Path,
    reference: Option<SystemTime>,
    visited: &mut HashSet<PathBuf>,
) -> Result<bool, StylesheetError> {
    let imports = scan_imports(less_file);
    if imports.is_empty() {
        return Ok(false);
    }

    let baseline = match reference {
        Some(time) => time,
        None => mtime(less_file).map_err(|source| StylesheetError::Source {
            path: less_file.to_path_buf(),
            source,
        })?,
    };

    for import in imports {
        if !visited.insert(import.clone()) {
            log::trace!(
                "Import {} already visited from {}",
                import.display(),
                less_file.display()
            );
            continue;
        }

        let import_mtime = mtime(&import).map_err(|source| StylesheetError::ImportResolution {
            import: import.clone(),
            referenced_from: less_file.to_path_buf(),
            source,
        })?;

        // Imports are judged against the importer's output, never their own.
        if import_mtime > baseline || walk_imports(&import, reference, visited)? {
            log::debug!(
                "{} contains updated import: {}",
                less_file.display(),
                import.display()
            );
            return Ok(true);
        }
    }

    Ok(false)
}
