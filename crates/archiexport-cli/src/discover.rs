//! Model file discovery
//!
//! When the configured model path does not exist, look for the first
//! `*.archimate` file below the directory it points into.

use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

/// Directory searched when the model path has no parent
const FALLBACK_DIR: &str = "model";

/// All `*.archimate` files under `dir`, sorted
pub fn find_models(dir: &Path) -> Vec<PathBuf> {
    let base = Pattern::escape(&dir.display().to_string());
    let pattern = format!("{}/**/*.archimate", base);

    let mut found: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => paths
            .filter_map(|entry| match entry {
                Ok(path) if path.is_file() => Some(path),
                Ok(_) => None,
                Err(e) => {
                    tracing::debug!("Skipping unreadable path: {}", e);
                    None
                }
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Invalid search pattern {}: {}", pattern, e);
            Vec::new()
        }
    };
    found.sort();
    found
}

/// Resolve the model path, searching nearby when it does not exist
///
/// Returns the path unchanged when it exists or when nothing is found.
pub fn resolve_model_path(path: &Path) -> PathBuf {
    if path.exists() {
        return path.to_path_buf();
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from(FALLBACK_DIR),
    };

    match find_models(&dir).into_iter().next() {
        Some(found) => {
            println!("Found model: {}", found.display());
            found
        }
        None => {
            tracing::debug!("No .archimate file found under {}", dir.display());
            path.to_path_buf()
        }
    }
}
