//! Formatted output helpers for CLI commands.

use std::fmt::Write as _;

use stencil_common::types::Catalog;
use stencil_compose::writer::WriteReport;

/// Formats the catalog as one line per app with its authors.
#[must_use]
pub fn format_app_list(catalog: &Catalog) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for (app, author, _) in catalog.pairs() {
        if current == Some(app) {
            let _ = write!(out, ", {author}");
        } else {
            if current.is_some() {
                out.push('\n');
            }
            let _ = write!(out, "{app}\t{author}");
            current = Some(app);
        }
    }
    if current.is_some() {
        out.push('\n');
    }
    out
}

/// Formats the summary of a catalog write.
#[must_use]
pub fn format_report(report: &WriteReport) -> String {
    let mut out = format!(
        "{} compose files written ({} backed up), {} failed",
        report.written,
        report.backed_up,
        report.failures.len()
    );
    for failure in &report.failures {
        let _ = write!(out, "\n  {} ({}): {}", failure.app, failure.author, failure.error);
    }
    out
}
