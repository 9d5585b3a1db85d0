//! Structured error types for rollables-core.
//!
//! Library consumers (the server, the build command) get composable errors;
//! the binary wraps them in `anyhow` for reporting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by the directory resolver
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The entry would resolve to a path outside the table root.
    ///
    /// Only the requested identifier is kept; the resolved absolute path
    /// never leaves the resolver.
    #[error("Entry '{entry}' resolves outside the table root")]
    OutOfBounds { entry: String },

    /// No content file exists for the entry
    #[error("Entry '{entry}' not found")]
    NotFound { entry: String },

    /// The configured root is missing or not a directory
    #[error("Table root {path:?} is unavailable: {source}")]
    RootUnavailable { path: PathBuf, source: io::Error },

    /// Directory traversal failed while indexing
    #[error("Failed to walk table root: {0}")]
    Walk(#[from] walkdir::Error),

    /// Any other filesystem failure, propagated unchanged
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ResolveError {
    pub fn out_of_bounds(entry: impl Into<String>) -> Self {
        Self::OutOfBounds {
            entry: entry.into(),
        }
    }

    pub fn not_found(entry: impl Into<String>) -> Self {
        Self::NotFound {
            entry: entry.into(),
        }
    }

    pub fn root_unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::RootUnavailable {
            path: path.into(),
            source,
        }
    }
}

/// Failures raised while baking the static bundle
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Filesystem write or copy failed
    #[error("I/O error at {path:?}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to walk source tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("JSON error writing {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

/// Failures raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("Invalid TOML in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolveError::out_of_bounds("../secrets");
        assert_eq!(
            err.to_string(),
            "Entry '../secrets' resolves outside the table root"
        );

        let err = ResolveError::not_found("monsters/troll");
        assert_eq!(err.to_string(), "Entry 'monsters/troll' not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: ResolveError = io_err.into();

        assert!(matches!(err, ResolveError::Io(_)));
    }

    #[test]
    fn test_build_error_wraps_resolve() {
        let err: BuildError = ResolveError::not_found("x").into();
        assert_eq!(err.to_string(), "Entry 'x' not found");
    }
}
