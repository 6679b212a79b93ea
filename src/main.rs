//! Wordle Arena Server
//!
//! Multiplayer Wordle / Absurdle over WebSocket.
//! Configuration comes from `WORDLE_*` environment variables.

use std::sync::Arc;
use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wordle_arena::{
    VERSION,
    network::{GameServer, ServerConfig},
};

#[cfg(feature = "debug-tracing")]
const DEFAULT_FILTER: &str = "debug";
#[cfg(not(feature = "debug-tracing"))]
const DEFAULT_FILTER: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Wordle Arena Server v{}", VERSION);

    let config = ServerConfig::from_env().context("invalid configuration")?;
    info!(
        "Mode: {}, {} words, {} rounds, {}s countdown",
        config.mode,
        config.game.word_list.len(),
        config.game.max_rounds,
        config.session.countdown_secs
    );

    let server = Arc::new(GameServer::new(config).context("failed to start game")?);

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stopping server...");
            signal_server.shutdown();
        }
    });

    server.run().await?;
    info!("Server stopped");
    Ok(())
}
