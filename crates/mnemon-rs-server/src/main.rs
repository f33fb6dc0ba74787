//! Mnemon server binary.

use clap::Parser;
use log::info;
use mnemon_rs_config::load_config_or_default;
use mnemon_rs_core::{ProviderRegistry, bootstrap};
use mnemon_rs_server::{ServerState, rocket};
use std::path::PathBuf;

/// Memory-augmented chat completions server.
#[derive(Debug, Parser)]
#[command(name = "mnemon-server", version, about)]
struct Args {
    /// Path to a JSON5 config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Bind address override.
    #[arg(long)]
    host: Option<String>,
    /// Port override.
    #[arg(long)]
    port: Option<u16>,
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = load_config_or_default(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let registry = ProviderRegistry::new();
    let runtime = bootstrap(&config, &registry)?;
    let writer = runtime.writer.clone();
    let state = ServerState::new(runtime.augmentor, runtime.writer, config.llm.model.clone());

    info!(
        "starting server (host={}, port={})",
        config.server.host, config.server.port
    );
    rocket(state, &config.server).launch().await?;

    // Drain pending background writes before exiting.
    writer.shutdown().await;
    Ok(())
}
