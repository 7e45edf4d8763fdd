//! Python file discovery.
//!
//! Inputs may be files or directories. Directories are walked for `.py`
//! files, skipping hidden entries and the usual generated trees
//! (`__pycache__`, virtualenvs). Discovery order is deterministic: inputs
//! in caller order, directory contents sorted by name, duplicates removed
//! at first occurrence.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Directory names never descended into.
const EXCLUDED_DIRS: &[&str] = &["__pycache__", ".venv", "venv", "node_modules"];

/// Error type for discovery.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("input not found: {path}")]
    NotFound { path: String },

    #[error("cannot walk {path}: {message}")]
    Walk { path: String, message: String },
}

/// Expand inputs into the ordered, de-duplicated list of Python files.
///
/// Explicit file inputs are taken as-is, whatever their extension; only
/// directory walks filter to `.py`.
pub fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut files: IndexSet<PathBuf> = IndexSet::new();

    for input in inputs {
        if input.is_file() {
            files.insert(input.clone());
        } else if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_excluded(e.path()))
            {
                let entry = entry.map_err(|e| DiscoverError::Walk {
                    path: input.display().to_string(),
                    message: e.to_string(),
                })?;
                if entry.file_type().is_file() && is_python_file(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        } else {
            return Err(DiscoverError::NotFound {
                path: input.display().to_string(),
            });
        }
    }

    debug!(count = files.len(), "discovered python files");
    Ok(files.into_iter().collect())
}

fn is_python_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

fn is_excluded(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    // Hidden entries cover .git, .tox, .mypy_cache and friends. Walk
    // roots are exempted by depth, so hidden inputs still work.
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}

// ============================================================================
// Tests
// ============================================================================
