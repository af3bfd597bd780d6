//! Descriptor discovery inside checkouts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use stencil_common::constants::{DESCRIPTOR_EXTENSION, EXCLUDED_DESCRIPTORS, EXCLUDED_DIRS};
use walkdir::{DirEntry, WalkDir};

use crate::sync::Checkout;

fn is_excluded_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy().to_lowercase();
    EXCLUDED_DIRS.iter().any(|excluded| name.contains(excluded))
}

fn is_descriptor(entry: &DirEntry) -> bool {
    if !entry.file_type().is_file() {
        return false;
    }
    let path = entry.path();
    let named_excluded = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| EXCLUDED_DESCRIPTORS.contains(&n));
    !named_excluded && path.extension().is_some_and(|ext| ext == DESCRIPTOR_EXTENSION)
}

/// Finds descriptor files under `dir`, sorted by path.
///
/// Tooling and deprecated directories are not descended into. Unreadable
/// entries are skipped.
#[must_use]
pub fn discover_descriptors(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry))
        .filter_map(std::result::Result::ok)
        .filter(is_descriptor)
        .map(DirEntry::into_path)
        .collect();
    found.sort();
    tracing::debug!(dir = %dir.display(), count = found.len(), "discovered descriptors");
    found
}

/// Groups the descriptors of every checkout by owner.
#[must_use]
pub fn collect_sources(checkouts: &[Checkout]) -> BTreeMap<String, Vec<PathBuf>> {
    let mut sources: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for checkout in checkouts {
        sources
            .entry(checkout.owner.clone())
            .or_default()
            .extend(discover_descriptors(&checkout.path));
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, "<Container/>").expect("write");
    }

    #[test]
    fn finds_xml_files_and_skips_exclusions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        touch(&root.join("plex.xml"));
        touch(&root.join("templates/sonarr.xml"));
        touch(&root.join("templates/readme.md"));
        touch(&root.join("ca_profile.xml"));
        touch(&root.join(".git/config.xml"));
        touch(&root.join(".github/workflow.xml"));
        touch(&root.join("Deprecated/old.xml"));
        touch(&root.join("known-issues/bug.xml"));
        touch(&root.join(".idea/workspace.xml"));

        let found = discover_descriptors(root);
        assert_eq!(found, [root.join("plex.xml"), root.join("templates/sonarr.xml")]);
    }

    #[test]
    fn excluded_name_in_root_path_does_not_hide_checkout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("issues-tracker");
        touch(&root.join("app.xml"));
        assert_eq!(discover_descriptors(&root), [root.join("app.xml")]);
    }

    #[test]
    fn sources_group_by_owner() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = dir.path().join("alice/one");
        let b = dir.path().join("alice/two");
        let c = dir.path().join("bob/three");
        touch(&a.join("x.xml"));
        touch(&b.join("y.xml"));
        touch(&c.join("z.xml"));

        let checkouts = [
            Checkout { owner: "alice".into(), path: a.clone() },
            Checkout { owner: "alice".into(), path: b.clone() },
            Checkout { owner: "bob".into(), path: c.clone() },
        ];
        let sources = collect_sources(&checkouts);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources["alice"], [a.join("x.xml"), b.join("y.xml")]);
        assert_eq!(sources["bob"], [c.join("z.xml")]);
    }

    #[test]
    fn missing_directory_yields_nothing() {
        assert!(discover_descriptors(Path::new("/nonexistent/checkout")).is_empty());
    }
}
