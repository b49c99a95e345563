use std::sync::Arc;

use anyhow::Context;
use poker_server::{config::ServerConfig, server, store::SessionStore};
use tokio::{
    net::TcpListener,
    signal::unix::{signal, SignalKind},
    sync::broadcast,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Arc::new(ServerConfig::from_env().context("invalid server configuration")?);
    let store = Arc::new(SessionStore::new());

    let mut interrupt =
        signal(SignalKind::interrupt()).context("failed to create interrupt signal stream")?;
    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("could not bind to {}", config.bind_addr()))?;
    let (quit_tx, quit_rx) = broadcast::channel::<()>(1);

    tokio::spawn(async move {
        interrupt.recv().await;
        let _ = quit_tx.send(());
    });

    info!(
        addr = %listener.local_addr()?,
        allowed_origins = ?config.allowed_origins,
        "Server is running"
    );
    server::serve(listener, store, config, quit_rx).await?;
    info!("Server shut down");

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("poker_server=info,warn")),
        )
        .with_target(false)
        .init();
}
