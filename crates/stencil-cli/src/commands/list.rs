//! `--list`: known app names.

use stencil_common::types::Catalog;

use crate::output;

/// Prints one line per app in the catalog.
pub fn execute(catalog: &Catalog) {
    tracing::debug!(apps = catalog.app_count(), "listing apps");
    print!("{}", output::format_app_list(catalog));
}
