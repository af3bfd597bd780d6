//! Output of rendered templates.
//!
//! Each (app, author) pair lands at
//! `<root>/<folder(app)>/<folder(author)>/docker-compose.yml`. An existing
//! file is renamed to `docker-compose.yml.old` first, replacing any older
//! backup. A failing pair is reported and the remaining pairs still run.

use std::path::{Path, PathBuf};

use stencil_common::constants::{BACKUP_SUFFIX, COMPOSE_FILE_NAME};
use stencil_common::error::{Result, StencilError};
use stencil_common::types::{Catalog, Template};

use crate::render::render;
use crate::sanitize::folder_name;

/// Result of writing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Path of the written file.
    pub path: PathBuf,
    /// Whether a previous file was moved aside.
    pub backed_up: bool,
}

/// A pair whose output could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// App name as found in the catalog.
    pub app: String,
    /// Author name as found in the catalog.
    pub author: String,
    /// Rendered error message.
    pub error: String,
}

/// Summary of a whole catalog write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files written.
    pub written: usize,
    /// Files that replaced an earlier one.
    pub backed_up: usize,
    /// Pairs that failed.
    pub failures: Vec<WriteFailure>,
}

/// Writes `contents` to `path`, moving an existing file to `<path>.old`.
///
/// Returns whether a backup was made.
///
/// # Errors
///
/// Returns an error if the backup rename or the write fails.
pub fn write_with_backup(path: &Path, contents: &str) -> Result<bool> {
    let backed_up = path.exists();
    if backed_up {
        let mut backup = path.as_os_str().to_owned();
        backup.push(BACKUP_SUFFIX);
        let backup = PathBuf::from(backup);
        tracing::info!(path = %path.display(), "compose file already exists, keeping backup");
        if backup.exists() {
            std::fs::remove_file(&backup).map_err(|e| StencilError::io(&backup, e))?;
        }
        std::fs::rename(path, &backup).map_err(|e| StencilError::io(path, e))?;
    }
    std::fs::write(path, contents).map_err(|e| StencilError::io(path, e))?;
    Ok(backed_up)
}

/// Writes rendered templates under one output root.
#[derive(Debug, Clone)]
pub struct CatalogWriter {
    root: PathBuf,
}

impl CatalogWriter {
    /// Creates a writer rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Output root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Destination file of one (app, author) pair.
    ///
    /// # Errors
    ///
    /// Returns an error if either name sanitizes to an empty string.
    pub fn destination(&self, app: &str, author: &str) -> Result<PathBuf> {
        let app_dir = folder_name(app);
        let author_dir = folder_name(author);
        if app_dir.trim().is_empty() || author_dir.trim().is_empty() {
            return Err(StencilError::Config {
                message: format!("cannot derive an output folder from {app:?} by {author:?}"),
            });
        }
        Ok(self.root.join(app_dir).join(author_dir).join(COMPOSE_FILE_NAME))
    }

    /// Renders and writes one template.
    ///
    /// # Errors
    ///
    /// Returns an error if the names are unusable or the file cannot be written.
    pub fn write_template(&self, app: &str, author: &str, template: &Template) -> Result<WriteOutcome> {
        let path = self.destination(app, author)?;

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| StencilError::io(dir, e))?;
        }
        let backed_up = write_with_backup(&path, &render(&folder_name(app), template))?;
        tracing::info!(path = %path.display(), "created compose file");
        Ok(WriteOutcome { path, backed_up })
    }

    /// Writes every pair of the catalog, continuing past failures.
    pub fn write_all(&self, catalog: &Catalog) -> WriteReport {
        let mut report = WriteReport::default();
        for (app, author, template) in catalog.pairs() {
            tracing::debug!(app, author, "creating compose file");
            match self.write_template(app, author, template) {
                Ok(outcome) => {
                    report.written += 1;
                    if outcome.backed_up {
                        report.backed_up += 1;
                    }
                }
                Err(e) => {
                    tracing::error!(app, author, error = %e, "failed to write compose file");
                    report.failures.push(WriteFailure {
                        app: app.to_owned(),
                        author: author.to_owned(),
                        error: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use stencil_common::types::{ResourceEntry, ResourceKind};

    use super::*;

    #[test]
    fn destination_uses_folder_sanitizer() {
        let writer = CatalogWriter::new("/out");
        let path = writer.destination("My App! 2.0", "some/one").expect("destination");
        assert_eq!(path, PathBuf::from("/out/My App 20/someone/docker-compose.yml"));
    }

    #[test]
    fn destination_rejects_empty_names() {
        let writer = CatalogWriter::new("/out");
        assert!(writer.destination("!!!", "alice").is_err());
        assert!(writer.destination("app", "   ").is_err());
    }

    #[test]
    fn any_usable_folder_name_yields_a_service() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = CatalogWriter::new(dir.path());
        for app in ["-", "_", "!Plex?"] {
            let outcome = writer
                .write_template(app, "me", &Template::new(app, "img"))
                .expect("write");
            let text = std::fs::read_to_string(&outcome.path).expect("read");
            assert!(!text.contains("container_name: \n"), "{app}");
        }
    }

    #[test]
    fn write_creates_directories_and_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = CatalogWriter::new(dir.path());
        let outcome = writer
            .write_template("Plex", "plexinc", &Template::new("Plex", "plexinc/pms-docker"))
            .expect("write");
        assert!(!outcome.backed_up);
        let text = std::fs::read_to_string(&outcome.path).expect("read");
        assert!(text.contains("container_name: plex\n"));
    }

    #[test]
    fn rewrite_keeps_single_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let writer = CatalogWriter::new(dir.path());
        let mut template = Template::new("App", "img:1");
        let first = writer.write_template("App", "me", &template).expect("first");

        template.image = "img:2".into();
        let second = writer.write_template("App", "me", &template).expect("second");
        assert!(second.backed_up);

        template.image = "img:3".into();
        let _ = writer.write_template("App", "me", &template).expect("third");

        let backup = first.path.with_file_name("docker-compose.yml.old");
        let current = std::fs::read_to_string(&first.path).expect("current");
        let previous = std::fs::read_to_string(&backup).expect("backup");
        assert!(current.contains("image: img:3"));
        assert!(previous.contains("image: img:2"));
    }

    #[test]
    fn write_all_continues_past_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut catalog = Catalog::new();
        let mut ok = Template::new("Good", "good");
        let _ = ok.insert_resource(ResourceKind::Port, "80", ResourceEntry::new("80").with_default("8080"));
        let _ = catalog.insert("Good", "alice", ok);
        let _ = catalog.insert("???", "alice", Template::new("???", "bad"));
        let _ = catalog.insert("Zed", "bob", Template::new("Zed", "zed"));

        let report = CatalogWriter::new(dir.path()).write_all(&catalog);
        assert_eq!(report.written, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].app, "???");
        assert!(dir.path().join("Zed/bob/docker-compose.yml").exists());
    }
}
