//! Run configuration for Stencil.
//!
//! Built once at startup and passed by reference into the orchestration
//! layer. The normalizer, aggregator and renderer never read it.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Root configuration for a Stencil run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StencilConfig {
    /// Directory receiving generated compose files, the catalog and the index.
    pub output_dir: PathBuf,
    /// Directory holding cloned template repositories.
    pub repo_dir: PathBuf,
    /// URL of the published repository list, if any.
    pub repository_list: Option<String>,
    /// Extra repository URLs cloned in addition to the published list.
    pub repositories: Vec<String>,
    /// Timeout in seconds for fetching the repository list.
    pub fetch_timeout_secs: u64,
}

impl Default for StencilConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            repo_dir: PathBuf::from(constants::DEFAULT_REPO_DIR),
            repository_list: Some(constants::DEFAULT_REPOSITORY_LIST.to_string()),
            repositories: Vec::new(),
            fetch_timeout_secs: constants::DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl StencilConfig {
    /// Catalog consumed by the writer.
    #[must_use]
    pub fn catalog_file(&self) -> PathBuf {
        self.output_dir.join(constants::CATALOG_FILE)
    }

    /// Catalog cache kept next to the repository checkouts.
    #[must_use]
    pub fn source_catalog_file(&self) -> PathBuf {
        self.repo_dir.join(constants::SOURCE_CATALOG_FILE)
    }

    /// Last resolved repository list, one URL per line.
    #[must_use]
    pub fn repository_cache_file(&self) -> PathBuf {
        self.repo_dir.join(constants::REPOSITORY_CACHE_FILE)
    }

    /// Index of generated directories.
    #[must_use]
    pub fn index_file(&self) -> PathBuf {
        self.output_dir.join(constants::INDEX_FILE)
    }

    /// Timeout applied to the repository list request.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
