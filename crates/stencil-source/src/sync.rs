//! Local git checkouts of template repositories.
//!
//! A repository lives at `<root>/<owner>/<name>`. An existing checkout is
//! updated with `git pull`, anything else is cloned fresh. A repository
//! that fails to sync is logged and skipped.

use std::path::{Path, PathBuf};
use std::process::Command;

use stencil_common::error::{Result, StencilError};

use crate::repository::RepositoryRef;

/// A repository available on disk after syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    /// Repository owner; used as the template author.
    pub owner: String,
    /// Checkout directory.
    pub path: PathBuf,
}

/// Clones and updates repositories under one root directory.
#[derive(Debug, Clone)]
pub struct RepositorySync {
    root: PathBuf,
    git: PathBuf,
}

impl RepositorySync {
    /// Creates a syncer using the `git` found on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`StencilError::NotFound`] if `git` is not installed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let git = which::which("git").map_err(|_| StencilError::NotFound {
            kind: "binary",
            id: "git".into(),
        })?;
        Ok(Self::with_git(root, git))
    }

    /// Creates a syncer using an explicit git binary.
    pub fn with_git(root: impl Into<PathBuf>, git: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            git: git.into(),
        }
    }

    /// Checkout root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Clones or pulls one repository and returns its checkout directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or git fails.
    pub fn sync(&self, repository: &RepositoryRef) -> Result<PathBuf> {
        let dir = repository.checkout_dir(&self.root);
        if dir.join(".git").exists() {
            tracing::info!(repository = %repository.clone_url, "pulling");
            self.run_git(repository, &dir, &["pull"])?;
        } else {
            tracing::info!(repository = %repository.clone_url, path = %dir.display(), "cloning");
            std::fs::create_dir_all(&dir).map_err(|e| StencilError::io(&dir, e))?;
            self.run_git(repository, &dir, &["clone", &repository.clone_url, "."])?;
        }
        Ok(dir)
    }

    /// Syncs every URL, skipping the ones that fail.
    pub fn sync_all<S: AsRef<str>>(&self, urls: &[S]) -> Vec<Checkout> {
        let mut checkouts = Vec::new();
        for url in urls {
            let url = url.as_ref();
            let result = RepositoryRef::parse(url).and_then(|repository| {
                self.sync(&repository).map(|path| Checkout {
                    owner: repository.owner,
                    path,
                })
            });
            match result {
                Ok(checkout) => checkouts.push(checkout),
                Err(e) => tracing::warn!(url, error = %e, "failed to clone"),
            }
        }
        tracing::info!(
            synced = checkouts.len(),
            requested = urls.len(),
            "repository sync finished"
        );
        checkouts
    }

    fn run_git(&self, repository: &RepositoryRef, dir: &Path, args: &[&str]) -> Result<()> {
        let output = Command::new(&self.git)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| StencilError::io(&self.git, e))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(StencilError::Source {
            repository: repository.clone_url.clone(),
            message: format!("git {} failed: {}", args.join(" "), stderr.trim()),
        })
    }
}
