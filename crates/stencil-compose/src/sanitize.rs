//! Name sanitizers.
//!
//! Two deliberately different policies: the service identifier keeps
//! `[A-Za-z0-9_-]` and is lower-cased; folder names keep `[A-Za-z0-9_ -]`
//! and preserve case.

/// Derives the compose service key and container name from an app name.
#[must_use]
pub fn service_identifier(name: &str) -> String {
    name.chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Derives a directory name from an app or author name.
#[must_use]
pub fn folder_name(name: &str) -> String {
    name.chars()
        .filter(|&c| c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '-'))
        .collect()
}
