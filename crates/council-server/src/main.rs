//! Council Server CLI
//!
//! Starts the HTTP server that streams council meetings and their decisions.

use anyhow::Context;
use clap::Parser;
use council_server::{config::ServerConfig, init_tracing, start_server};
use std::path::PathBuf;

/// Council meetings backend
#[derive(Debug, Parser)]
#[command(name = "council-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Load configuration from a TOML file
    #[arg(short, long, env = "COUNCIL_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the file and PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Concurrent workers per meetings stream
    #[arg(short, long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env().context("reading environment")?;
    if let Some(port) = cli.port {
        config.bind_port = port;
    }
    if let Some(workers) = cli.workers {
        config.pipeline.worker_count = workers;
    }

    init_tracing(&config.log_level);
    if cli.config.is_none() {
        tracing::info!("No config file given, using defaults and environment");
    }

    start_server(config).await?;
    Ok(())
}
