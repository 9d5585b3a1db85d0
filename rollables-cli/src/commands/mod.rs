//! Command implementations for the rollables CLI

pub mod build;
pub mod serve;

use std::path::Path;

use anyhow::{Context, Result};
use rollables_core::RollablesConfig;

// Re-export dispatcher functions for flat access from main.rs
pub use build::run_build;
pub use serve::run_serve;

/// Load layered config (defaults, file, environment) before flag overrides
pub fn load_config(path: Option<&Path>) -> Result<RollablesConfig> {
    RollablesConfig::load(path).context("Failed to load rollables configuration")
}
