//! Unified error types for the Stencil workspace.
//!
//! Library crates return [`Result`]; the binary wraps it in `anyhow` at the
//! orchestration boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StencilError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A template descriptor could not be interpreted.
    #[error("malformed descriptor: {message}")]
    Malformed {
        /// What was wrong with the descriptor.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// A template source repository could not be fetched or updated.
    #[error("source {repository} failed: {message}")]
    Source {
        /// Repository URL or list URL that failed.
        repository: String,
        /// Description of the failure.
        message: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl StencilError {
    /// Builds an [`StencilError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a [`StencilError::Malformed`] from any displayable message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StencilError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display_includes_path() {
        let err = StencilError::io(
            "/tmp/out/docker-compose.yml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let text = err.to_string();
        assert!(text.contains("/tmp/out/docker-compose.yml"));
        assert!(text.contains("denied"));
    }

    #[test]
    fn malformed_display_carries_message() {
        let err = StencilError::malformed("no Container root");
        assert_eq!(err.to_string(), "malformed descriptor: no Container root");
    }

    #[test]
    fn serde_errors_convert() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: StencilError = parse.expect_err("invalid json").into();
        assert!(matches!(err, StencilError::Serialization { .. }));
    }
}
