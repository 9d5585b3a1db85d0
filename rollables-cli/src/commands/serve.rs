//! HTTP server command
//!
//! Serves the table root over the read API until the process is stopped.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use rollables_core::Resolver;
use rollables_server::{serve, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Table root directory (overrides config)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Address to bind to (overrides config, default 127.0.0.1)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,

    /// Port to listen on (overrides config, default 3030)
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Content-file suffix (overrides config, default yml)
    #[arg(long)]
    pub extension: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(root) = args.root {
        config.root = root;
    }
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(extension) = args.extension {
        config.extension = extension;
    }

    let resolver = Resolver::from_config(&config)
        .with_context(|| format!("Cannot open table root {}", config.root.display()))?;
    let server_config = ServerConfig::from_config(&config)?;

    serve(resolver, server_config).await.context("Server error")?;
    Ok(())
}
