//! Catalog index of generated directories.
//!
//! Maps every top-level directory of the output root to the sorted names
//! of its immediate subdirectories (one per author).

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use stencil_common::error::{Result, StencilError};
use stencil_common::json;

/// Top-level directory name to its subdirectory names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CatalogIndex(BTreeMap<String, Vec<String>>);

impl CatalogIndex {
    /// Subdirectories of one top-level directory.
    #[must_use]
    pub fn get(&self, app: &str) -> Option<&[String]> {
        self.0.get(app).map(Vec::as_slice)
    }

    /// Number of top-level directories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no directory was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| StencilError::io(dir, e))? {
        let entry = entry.map_err(|e| StencilError::io(dir, e))?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Scans `root` two levels deep.
///
/// # Errors
///
/// Returns an error if a directory cannot be listed.
pub fn build_index(root: &Path) -> Result<CatalogIndex> {
    let mut index = BTreeMap::new();
    for app in subdirectories(root)? {
        let authors = subdirectories(&root.join(&app))?;
        let _ = index.insert(app, authors);
    }
    Ok(CatalogIndex(index))
}

/// Builds the index of `root` and writes it to `path`.
///
/// # Errors
///
/// Returns an error if scanning or writing fails.
pub fn write_index(root: &Path, path: &Path) -> Result<CatalogIndex> {
    let index = build_index(root)?;
    let bytes = json::to_vec_indented(&index)?;
    std::fs::write(path, bytes).map_err(|e| StencilError::io(path, e))?;
    tracing::info!(path = %path.display(), apps = index.len(), "wrote catalog index");
    Ok(index)
}
