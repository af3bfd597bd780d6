//! Compose file generation for a loaded catalog.

use anyhow::Context;
use stencil_common::config::StencilConfig;
use stencil_common::types::Catalog;
use stencil_compose::index::write_index;
use stencil_compose::writer::{CatalogWriter, WriteReport};

use crate::output;

/// Writes every (app, author) pair and the index, then prints a summary.
///
/// # Errors
///
/// Returns an error if the output directory or the index cannot be written.
/// Individual pair failures only appear in the report.
pub fn execute(config: &StencilConfig, catalog: &Catalog) -> anyhow::Result<WriteReport> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;

    let report = CatalogWriter::new(&config.output_dir).write_all(catalog);
    let _ = write_index(&config.output_dir, &config.index_file())?;

    println!("{}", output::format_report(&report));
    Ok(report)
}
