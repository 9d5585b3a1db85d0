//! Static build command
//!
//! Writes `index.json` and a copy of the table root into the output
//! directory. `--bundle` swaps the copy for a single `tables.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rollables_core::{build, BuildMode, BuildOptions, Resolver};
use tracing::info;

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Table root directory (overrides config)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Output asset directory (overrides config)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Content-file suffix (overrides config, default yml)
    #[arg(long)]
    pub extension: Option<String>,

    /// Write one id -> content JSON bundle instead of copying the source tree
    #[arg(long)]
    pub bundle: bool,
}

pub fn run_build(args: BuildArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(out) = args.out {
        config.out_dir = out;
    }
    if let Some(extension) = args.extension {
        config.extension = extension;
    }

    let resolver = Resolver::from_config(&config)
        .with_context(|| format!("Cannot open table root {}", config.root.display()))?;

    let mode = if args.bundle {
        BuildMode::Bundle
    } else {
        BuildMode::Copy
    };
    let options = BuildOptions::new(&config.out_dir).with_mode(mode);

    info!(
        "building {:?} -> {:?} ({:?})",
        resolver.root(),
        options.out_dir,
        mode
    );

    let report = build(&resolver, &options)
        .with_context(|| format!("Build into {} failed", config.out_dir.display()))?;

    info!(
        entries = report.entries,
        copied = report.copied_files,
        index = %report.index_path.display(),
        "build complete"
    );
    Ok(())
}
