//! Thin runner: load configuration, wire the core, run until interrupted.

use anyhow::Result;
use arbscan_core::ConfigLoader;
use arbscan_orchestrator::{Core, Scheduler};
use arbscan_web_api::ApiServer;
use clap::Parser;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "arbscan", about = "Sportsbook odds ingestion and arbitrage detection")]
struct Cli {
    /// Configuration file, merged with ARBSCAN_-prefixed env vars.
    #[arg(long, default_value = "config/arbscan.toml")]
    config: String,

    /// Run one retention sweep and exit.
    #[arg(long)]
    sweep_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::load_from(&cli.config)?;

    let core = Arc::new(Core::connect(config).await?);

    if cli.sweep_only {
        let stats = core.sweeper().run_once().await?;
        tracing::info!(?stats, "sweep complete");
        return Ok(());
    }

    let sweeper = core.sweeper();
    tokio::spawn(sweeper.run());

    let scheduler = Arc::new(Scheduler::new(core.clone()));
    let server = ApiServer::new(scheduler.clone());
    let bind = core.config.server.bind.clone();
    tokio::spawn(async move {
        if let Err(err) = server.serve(&bind).await {
            tracing::error!(error = %err, "stats surface failed");
        }
    });

    tokio::select! {
        () = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    core.db.close().await;
    Ok(())
}
