//! Process wiring: store, transport, services, background tasks and the HTTP listener.

use std::sync::Arc;

use anyhow::{Context, Result};
use inbox_core::{init_tracing, TwilioTransport};
use inbox_engine::OutboundRoute;
use presence::PresenceTracker;
use storage::Store;
use tracing::{info, instrument};

use crate::config::ServerConfig;
use crate::routes::router;
use crate::state::AppState;

/// Connects the store and builds the outbound route from config.
pub async fn connect(config: &ServerConfig) -> Result<(Store, OutboundRoute)> {
    let store = Store::connect(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let transport =
        TwilioTransport::new(config.twilio.clone()).context("Failed to build Twilio transport")?;
    let route = OutboundRoute::new(Arc::new(transport), config.senders.clone())
        .with_timeout(config.transport_timeout);
    Ok((store, route))
}

/// Initialises tracing, then serves until the listener fails.
#[instrument(skip(config))]
pub async fn run_server(config: ServerConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;
    info!(config = %config.describe(), "Initializing server");

    let (store, route) = connect(&config).await?;
    let presence = PresenceTracker::new();
    let _presence_sweep = presence.start();
    let state = AppState::new(store, route, presence, config.cron_secret.clone());

    let _sweeper = config
        .sweep_interval
        .map(|every| Arc::clone(&state.sweeper).spawn_periodic(every));

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(bind_addr = %config.bind_addr, "Server started");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
