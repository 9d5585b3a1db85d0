//! Rollables configuration - table root, build output, server address
//!
//! Values are layered, lowest precedence first:
//! - built-in defaults
//! - a TOML file (`--config`, else `./rollables.toml` when present)
//! - environment: `ROLLABLES_ROOT`, `ROLLABLES_OUT`, `ROLLABLES_EXTENSION`, `ROLLABLES_PORT`
//!
//! CLI flags are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "rollables.toml";

/// Content-file suffix recognized by default
pub const DEFAULT_EXTENSION: &str = "yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollablesConfig {
    /// Directory holding the table files
    pub root: PathBuf,
    /// Asset directory written by `rollables build`
    pub out_dir: PathBuf,
    /// Content-file suffix, without the leading dot
    pub extension: String,
    pub server: ServerSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

impl Default for RollablesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("tables"),
            out_dir: PathBuf::from("public/data"),
            extension: DEFAULT_EXTENSION.to_string(),
            server: ServerSection::default(),
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}

impl RollablesConfig {
    /// Load config from an explicit file, or `./rollables.toml` if it exists,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML config file; missing keys fall back to defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.extension = normalize_extension(&config.extension);

        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Apply `ROLLABLES_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup("ROLLABLES_ROOT") {
            self.root = PathBuf::from(root);
        }
        if let Some(out_dir) = lookup("ROLLABLES_OUT") {
            self.out_dir = PathBuf::from(out_dir);
        }
        if let Some(extension) = lookup("ROLLABLES_EXTENSION") {
            self.extension = normalize_extension(&extension);
        }
        if let Some(port) = lookup("ROLLABLES_PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: "ROLLABLES_PORT".to_string(),
                reason: format!("'{}' is not a port number", port),
            })?;
        }
        Ok(())
    }
}

/// Strip a leading dot so `.yml` and `yml` mean the same suffix
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_string()
}
