//! rollables CLI - serve a directory of rollable tables or bake it into static assets
//!
//! - `serve`: HTTP read API (`GET /` listing, `GET /<entry>` raw table)
//! - `build`: one-shot static build (`index.json` + copied `source/` tree)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "rollables",
    author,
    version,
    about = "Serve or bake a directory of rollable tables",
    long_about = "Index a directory of table files and expose it over a small read-only HTTP API, \
                  or bake it into flat JSON assets for static hosting."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ./rollables.toml when present)
    #[arg(long, short = 'c', global = true, env = "ROLLABLES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP read API over the table root
    Serve(commands::serve::ServeArgs),
    /// Write the index and copy the table root into the asset directory
    Build(commands::build::BuildArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config_path).await?,
        Commands::Build(args) => commands::run_build(args, config_path)?,
    }
    Ok(())
}
