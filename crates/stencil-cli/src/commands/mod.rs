//! CLI argument definitions and dispatch.

pub mod generate;
pub mod list;
pub mod refresh;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stencil_common::config::StencilConfig;
use stencil_common::constants::{
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_OUTPUT_DIR, DEFAULT_REPO_DIR, DEFAULT_REPOSITORY_LIST,
    ENV_OUTPUT_DIR, ENV_REPO_DIR, ENV_REPOSITORIES, ENV_REPOSITORY_LIST,
};
use stencil_template::store::CatalogStore;

/// Stencil: Unraid container templates as docker-compose files.
#[derive(Parser, Debug)]
#[command(name = "stencil", version, about, long_about = None)]
pub struct Cli {
    /// Re-fetch repositories and rebuild the catalog before generating.
    #[arg(long = "update-templates", alias = "update_templates")]
    pub update_templates: bool,

    /// Print the known app names instead of generating files.
    #[arg(long)]
    pub list: bool,

    /// Directory receiving compose files, the catalog and the index.
    #[arg(long, env = ENV_OUTPUT_DIR, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Directory holding the repository checkouts.
    #[arg(long, env = ENV_REPO_DIR, default_value = DEFAULT_REPO_DIR)]
    pub repo_dir: PathBuf,

    /// URL of the published repository list; empty disables it.
    #[arg(long, env = ENV_REPOSITORY_LIST, default_value = DEFAULT_REPOSITORY_LIST)]
    pub repository_list: String,

    /// Extra repository URLs, comma-separated.
    #[arg(long = "repository", env = ENV_REPOSITORIES, value_delimiter = ',')]
    pub repositories: Vec<String>,

    /// Timeout in seconds for fetching the repository list.
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout: u64,
}

impl Cli {
    /// Builds the run configuration from the parsed arguments.
    #[must_use]
    pub fn to_config(&self) -> StencilConfig {
        let repository_list = Some(self.repository_list.trim())
            .filter(|url| !url.is_empty())
            .map(str::to_owned);
        StencilConfig {
            output_dir: self.output_dir.clone(),
            repo_dir: self.repo_dir.clone(),
            repository_list,
            repositories: self
                .repositories
                .iter()
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty())
                .collect(),
            fetch_timeout_secs: self.fetch_timeout,
        }
    }
}

/// Runs one pass: load or refresh the catalog, then list or generate.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, refreshed or indexed.
pub fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.to_config();
    let store = CatalogStore::open(config.catalog_file());
    let mut catalog = store
        .load()
        .with_context(|| format!("failed to load {}", store.path().display()))?;

    if cli.update_templates || catalog.is_empty() {
        tracing::info!(forced = cli.update_templates, "refreshing template catalog");
        catalog = refresh::execute(&config)?;
    }

    if cli.list {
        list::execute(&catalog);
        return Ok(());
    }
    let _ = generate::execute(&config, &catalog)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("stencil").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn update_flag_accepts_both_spellings() {
        assert!(parse(&["--update-templates"]).update_templates);
        assert!(parse(&["--update_templates"]).update_templates);
        assert!(!parse(&[]).update_templates);
    }

    #[test]
    fn repositories_split_on_commas() {
        let cli = parse(&["--repository", "https://github.com/a/b, https://github.com/c/d,"]);
        assert_eq!(
            cli.to_config().repositories,
            ["https://github.com/a/b", "https://github.com/c/d"]
        );
    }

    #[test]
    fn empty_repository_list_disables_fetch() {
        let cli = parse(&["--repository-list", ""]);
        assert_eq!(cli.to_config().repository_list, None);
    }

    #[test]
    fn config_carries_directories_and_timeout() {
        let cli = parse(&["--output-dir", "/out", "--repo-dir", "/repos", "--fetch-timeout", "5"]);
        let config = cli.to_config();
        assert_eq!(config.output_dir, PathBuf::from("/out"));
        assert_eq!(config.repo_dir, PathBuf::from("/repos"));
        assert_eq!(config.fetch_timeout_secs, 5);
    }

    #[test]
    fn existing_catalog_is_listed_without_refresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");
        let mut catalog = stencil_common::types::Catalog::new();
        let _ = catalog.insert(
            "Plex",
            "plexinc",
            stencil_common::types::Template::new("Plex", "plexinc/pms-docker"),
        );
        CatalogStore::open(out.join("templates.json"))
            .save(&catalog)
            .expect("seed catalog");

        let out_arg = out.to_string_lossy().into_owned();
        let cli = parse(&["--list", "--output-dir", &out_arg, "--repository-list", ""]);
        execute(&cli).expect("list");
        assert!(!out.join("Plex").exists());
    }

    #[test]
    fn existing_catalog_is_generated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("out");
        let mut catalog = stencil_common::types::Catalog::new();
        let _ = catalog.insert(
            "Plex",
            "plexinc",
            stencil_common::types::Template::new("Plex", "plexinc/pms-docker"),
        );
        CatalogStore::open(out.join("templates.json"))
            .save(&catalog)
            .expect("seed catalog");

        let out_arg = out.to_string_lossy().into_owned();
        execute(&parse(&["--output-dir", &out_arg])).expect("generate");
        assert!(out.join("Plex/plexinc/docker-compose.yml").exists());
        assert!(out.join("app_list.json").exists());
    }
}
