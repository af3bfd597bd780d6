//! Catalog persistence.
//!
//! The catalog is the only durable artifact between a refresh and a
//! generation pass: a JSON object, keys sorted, indented by four spaces.

use std::path::{Path, PathBuf};

use stencil_common::error::{Result, StencilError};
use stencil_common::json;
use stencil_common::types::Catalog;

/// Catalog backed by a JSON file.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    /// Opens a store at `path`; nothing is read until [`CatalogStore::load`].
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the catalog file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the catalog; a missing file yields an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Catalog> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no catalog on disk");
            return Ok(Catalog::new());
        }
        tracing::info!(path = %self.path.display(), "loading templates");
        let content = std::fs::read(&self.path).map_err(|e| StencilError::io(&self.path, e))?;
        let mut catalog: Catalog = serde_json::from_slice(&content)?;
        catalog.backfill();
        Ok(catalog)
    }

    /// Writes the catalog, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StencilError::io(parent, e))?;
        }
        let bytes = json::to_vec_indented(catalog)?;
        std::fs::write(&self.path, bytes).map_err(|e| StencilError::io(&self.path, e))?;
        tracing::info!(
            path = %self.path.display(),
            templates = catalog.len(),
            "saved templates"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use stencil_common::types::{ResourceEntry, ResourceKind, Template};

    use super::*;

    fn sample() -> Catalog {
        let mut template = Template::new("Plex", "plexinc/pms-docker");
        let _ = template.insert_resource(
            ResourceKind::Port,
            "32400",
            ResourceEntry::new("32400").with_default("32400").with_description(""),
        );
        let mut catalog = Catalog::new();
        let _ = catalog.insert("Plex", "plexinc", template);
        catalog
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CatalogStore::open(dir.path().join("templates.json"));
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn save_then_load_preserves_templates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CatalogStore::open(dir.path().join("nested").join("templates.json"));
        store.save(&sample()).expect("save");
        let loaded = store.load().expect("load");
        assert_eq!(loaded, sample());
    }

    #[test]
    fn saved_json_is_indented_by_four_spaces() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = CatalogStore::open(dir.path().join("templates.json"));
        store.save(&sample()).expect("save");
        let text = std::fs::read_to_string(store.path()).expect("read");
        assert!(text.starts_with("{\n    \"Plex\": {\n        \"plexinc\": {\n"));
    }

    #[test]
    fn load_accepts_null_target_and_network_mode() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("templates.json");
        std::fs::write(
            &path,
            r#"{"App":{"alice":{"description":null,"devices":{},"environment":{"TZ":{"Default":"UTC","Description":null,"Target":null}},"extra_parameters":null,"image":"img","labels":{},"network_mode":null,"ports":{},"post_arguments":null,"volumes":{}}}}"#,
        )
        .expect("write");

        let catalog = CatalogStore::open(path).load().expect("load");
        let template = catalog.get("App", "alice").expect("present");
        assert_eq!(template.name, "App");
        assert_eq!(template.network_mode, "bridge");
        assert_eq!(template.environment["TZ"].target, "TZ");
        assert_eq!(template.environment["TZ"].default.as_deref(), Some("UTC"));
    }

    #[test]
    fn load_rejects_invalid_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("templates.json");
        std::fs::write(&path, "not json").expect("write");
        let err = CatalogStore::open(path).load().expect_err("should fail");
        assert!(matches!(err, StencilError::Serialization { .. }));
    }
}
