//! Catalog aggregation across authors and descriptors.
//!
//! Every descriptor is isolated: a read failure, malformed XML or a
//! discarded template contributes nothing and never stops the pass.
//! Fragments merge by plain overwrite, so the last descriptor processed for
//! an (app, author) pair wins in full.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use stencil_common::types::Catalog;

use crate::parser;

/// Something a raw descriptor can be read from.
pub trait DescriptorSource {
    /// Human-readable origin used in diagnostics, usually a file path.
    fn origin(&self) -> Cow<'_, str>;

    /// Reads the raw descriptor text.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the content is unavailable.
    fn read(&self) -> std::io::Result<String>;
}

impl DescriptorSource for Path {
    fn origin(&self) -> Cow<'_, str> {
        self.to_string_lossy()
    }

    fn read(&self) -> std::io::Result<String> {
        std::fs::read_to_string(self)
    }
}

impl DescriptorSource for PathBuf {
    fn origin(&self) -> Cow<'_, str> {
        self.as_path().origin()
    }

    fn read(&self) -> std::io::Result<String> {
        self.as_path().read()
    }
}

impl<T: DescriptorSource + ?Sized> DescriptorSource for &T {
    fn origin(&self) -> Cow<'_, str> {
        (**self).origin()
    }

    fn read(&self) -> std::io::Result<String> {
        (**self).read()
    }
}

/// A descriptor held in memory.
#[derive(Debug, Clone)]
pub struct InlineDescriptor {
    /// Diagnostic origin.
    pub origin: String,
    /// Raw descriptor text.
    pub content: String,
}

impl InlineDescriptor {
    /// Creates an in-memory descriptor.
    pub fn new(origin: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            content: content.into(),
        }
    }
}

impl DescriptorSource for InlineDescriptor {
    fn origin(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.origin)
    }

    fn read(&self) -> std::io::Result<String> {
        Ok(self.content.clone())
    }
}

/// Counters for one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Descriptors that produced a template.
    pub accepted: usize,
    /// Descriptors without name or repository.
    pub discarded: usize,
    /// Descriptors that failed to parse.
    pub malformed: usize,
    /// Descriptors that could not be read.
    pub unreadable: usize,
    /// Templates that replaced an earlier one for the same (app, author).
    pub replaced: usize,
    /// `Config` entries with an unknown type tag.
    pub unknown_kinds: usize,
    /// `Config` entries dropped for a missing key or target.
    pub skipped_entries: usize,
}

/// Builds a [`Catalog`] one descriptor at a time.
#[derive(Debug, Default)]
pub struct Aggregator {
    catalog: Catalog,
    stats: AggregateStats,
}

impl Aggregator {
    /// Creates an aggregator with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and normalizes one descriptor on behalf of `author`.
    pub fn ingest<S: DescriptorSource + ?Sized>(&mut self, author: &str, source: &S) {
        let origin = source.origin();
        match source.read() {
            Ok(content) => self.ingest_str(author, &origin, &content),
            Err(e) => {
                tracing::debug!(origin = %origin, error = %e, "skipping unreadable descriptor");
                self.stats.unreadable += 1;
            }
        }
    }

    /// Normalizes descriptor text already in memory.
    pub fn ingest_str(&mut self, author: &str, origin: &str, content: &str) {
        match parser::normalize_str(content) {
            Ok(Some(normalized)) => {
                self.stats.accepted += 1;
                self.stats.unknown_kinds += normalized.extraction.unknown_kinds.len();
                self.stats.skipped_entries += normalized.extraction.skipped;
                tracing::debug!(
                    origin,
                    author,
                    app = %normalized.template.name,
                    resources = normalized.template.resource_count(),
                    "template accepted"
                );
                let replaced = self.catalog.merge(normalized.into_fragment(author));
                if replaced > 0 {
                    tracing::debug!(origin, author, "template replaced an earlier descriptor");
                    self.stats.replaced += replaced;
                }
            }
            Ok(None) => {
                tracing::debug!(origin, "descriptor without name or repository discarded");
                self.stats.discarded += 1;
            }
            Err(e) => {
                tracing::warn!(origin, error = %e, "failed to parse template");
                self.stats.malformed += 1;
            }
        }
    }

    /// Counters so far.
    #[must_use]
    pub const fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Logs the pass summary and returns the catalog.
    #[must_use]
    pub fn finish(self) -> Catalog {
        let s = self.stats;
        tracing::info!(
            apps = self.catalog.app_count(),
            templates = self.catalog.len(),
            accepted = s.accepted,
            discarded = s.discarded,
            malformed = s.malformed,
            unreadable = s.unreadable,
            replaced = s.replaced,
            unknown_kinds = s.unknown_kinds,
            skipped_entries = s.skipped_entries,
            "template aggregation complete"
        );
        self.catalog
    }
}

/// Aggregates every author's descriptors into one catalog.
pub fn aggregate<A, I>(sources: impl IntoIterator<Item = (A, I)>) -> Catalog
where
    A: AsRef<str>,
    I: IntoIterator,
    I::Item: DescriptorSource,
{
    let mut aggregator = Aggregator::new();
    for (author, descriptors) in sources {
        let author = author.as_ref();
        for descriptor in descriptors {
            aggregator.ingest(author, &descriptor);
        }
    }
    aggregator.finish()
}
