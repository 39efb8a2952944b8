//! inbox CLI: serve the API, run one scheduled sweep (for cron), print dashboard stats. Config from env.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use inbox_cli::{Cli, Commands};
use inbox_core::init_tracing;
use inbox_engine::{InboxService, ScheduledSweeper};
use inbox_server::{connect, database_url_from_env, run_server, ServerConfig};
use storage::Store;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    match Cli::parse().command {
        Commands::Serve { bind } => {
            let mut config = load_config()?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            run_server(config).await
        }
        Commands::Sweep => handle_sweep(load_config()?).await,
        Commands::Stats => handle_stats(&database_url_from_env()).await,
    }
}

fn load_config() -> Result<ServerConfig> {
    ServerConfig::load().context("Load config from .env or environment")
}

/// Runs one sweep against the configured store and transport.
async fn handle_sweep(config: ServerConfig) -> Result<()> {
    init_tracing(&config.log_file)?;
    let (store, route) = connect(&config).await?;

    let report = ScheduledSweeper::new(store, route)
        .sweep(Utc::now())
        .await
        .context("Scheduled sweep failed")?;
    info!(processed = report.processed, "One-shot sweep finished");

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Reads the store only; no provider credentials needed.
async fn handle_stats(database_url: &str) -> Result<()> {
    let store = Store::connect(database_url)
        .await
        .with_context(|| format!("Open store at {}", database_url))?;
    let stats = InboxService::new(store)
        .dashboard_stats()
        .await
        .context("Query dashboard stats")?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
