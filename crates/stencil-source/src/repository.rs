//! Template repository references and the repository list.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use stencil_common::error::{Result, StencilError};

/// One entry of the published repository list.
#[derive(Debug, Deserialize)]
struct RepositoryListEntry {
    #[serde(default)]
    url: Option<String>,
}

/// Parses a repository list body: a JSON array of objects with a `url` field.
///
/// Entries without a URL are ignored.
///
/// # Errors
///
/// Returns an error if the body is not such an array.
pub fn parse_repository_list(body: &str) -> Result<Vec<String>> {
    let entries: Vec<RepositoryListEntry> = serde_json::from_str(body)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| entry.url)
        .filter(|url| !url.trim().is_empty())
        .collect())
}

/// Downloads and parses the repository list at `url`.
///
/// # Errors
///
/// Returns [`StencilError::Source`] on network failure or a non-success
/// status, and a serialization error for a malformed body.
pub fn fetch_repository_list(url: &str, timeout: Duration) -> Result<Vec<String>> {
    tracing::info!(url, "fetching repository list");
    let source_err = |message: String| StencilError::Source {
        repository: url.to_owned(),
        message,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| source_err(format!("failed to build HTTP client: {e}")))?;
    let response = client
        .get(url)
        .send()
        .map_err(|e| source_err(format!("request failed: {e}")))?;
    if !response.status().is_success() {
        return Err(source_err(format!("HTTP {}", response.status())));
    }
    let body = response
        .text()
        .map_err(|e| source_err(format!("failed to read response body: {e}")))?;
    parse_repository_list(&body)
}

/// A repository URL reduced to `https://host/owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    /// URL passed to `git clone`.
    pub clone_url: String,
    /// Account owning the repository; used as the template author.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepositoryRef {
    /// Parses a repository URL, dropping anything past the repository name
    /// (such as `/tree/master/templates`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no owner and name segments.
    pub fn parse(url: &str) -> Result<Self> {
        let segments: Vec<&str> = url.trim().split('/').take(5).collect();
        match segments.as_slice() {
            [_, _, _, owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                clone_url: segments.join("/"),
                owner: (*owner).to_owned(),
                name: (*name).to_owned(),
            }),
            _ => Err(StencilError::Config {
                message: format!("not a repository URL: {url}"),
            }),
        }
    }

    /// Checkout directory under `root`: `<root>/<owner>/<name>`.
    #[must_use]
    pub fn checkout_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.owner).join(&self.name)
    }
}

/// Last resolved repository list, one URL per line.
#[derive(Debug, Clone)]
pub struct RepositoryCache {
    path: PathBuf,
}

impl RepositoryCache {
    /// Opens the cache at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the cached URLs; a missing file yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StencilError::io(&self.path, e))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Replaces the cached URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self, repositories: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StencilError::io(parent, e))?;
        }
        let mut content = String::new();
        for repository in repositories {
            content.push_str(repository);
            content.push('\n');
        }
        std::fs::write(&self.path, content).map_err(|e| StencilError::io(&self.path, e))
    }
}

/// Resolves the repositories to sync: the published list (if configured)
/// followed by `extra`, without duplicates. A list fetch failure falls back
/// to the cached list. The result is written back to the cache.
///
/// # Errors
///
/// Returns an error only if the cache cannot be read or written.
pub fn resolve_repositories(
    list_url: Option<&str>,
    extra: &[String],
    timeout: Duration,
    cache: &RepositoryCache,
) -> Result<Vec<String>> {
    let mut repositories = match list_url {
        Some(url) => fetch_repository_list(url, timeout).or_else(|e| {
            tracing::warn!(url, error = %e, "repository list unavailable, using cached list");
            cache.load()
        })?,
        None => Vec::new(),
    };
    for url in extra.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        repositories.push(url.to_owned());
    }

    let mut seen = std::collections::HashSet::new();
    repositories.retain(|url| seen.insert(url.clone()));

    cache.save(&repositories)?;
    tracing::info!(count = repositories.len(), "resolved template repositories");
    Ok(repositories)
}
