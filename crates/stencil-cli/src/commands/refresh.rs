//! Catalog refresh: repositories to a fresh catalog.

use stencil_common::config::StencilConfig;
use stencil_common::types::Catalog;
use stencil_source::discover::collect_sources;
use stencil_source::repository::{RepositoryCache, resolve_repositories};
use stencil_source::sync::RepositorySync;
use stencil_template::aggregate::aggregate;
use stencil_template::store::CatalogStore;

/// Resolves, syncs and scans every repository, then persists the catalog
/// next to the checkouts and in the output directory.
///
/// # Errors
///
/// Returns an error if `git` is missing or a cache or catalog cannot be
/// written.
pub fn execute(config: &StencilConfig) -> anyhow::Result<Catalog> {
    let cache = RepositoryCache::open(config.repository_cache_file());
    let urls = resolve_repositories(
        config.repository_list.as_deref(),
        &config.repositories,
        config.fetch_timeout(),
        &cache,
    )?;
    if urls.is_empty() {
        tracing::warn!("no template repositories configured");
    }

    let checkouts = RepositorySync::new(&config.repo_dir)?.sync_all(&urls);
    let catalog = aggregate(collect_sources(&checkouts));

    CatalogStore::open(config.source_catalog_file()).save(&catalog)?;
    CatalogStore::open(config.catalog_file()).save(&catalog)?;
    Ok(catalog)
}
