use std::sync::Mutex;

use anyhow::Context;
use config::ClientConfig;
use state_store::StateStore;
use termination::{create_termination, Interrupted};
use ui_management::UiManager;

mod config;
mod state_store;
mod termination;
mod ui_management;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let config = ClientConfig::from_env();
    let (terminator, mut interrupt_rx) = create_termination();
    let (state_store, state_rx) = StateStore::new(config);
    let (ui_manager, action_rx) = UiManager::new();

    tokio::try_join!(
        state_store.main_loop(terminator, action_rx, interrupt_rx.resubscribe()),
        ui_manager.main_loop(state_rx, interrupt_rx.resubscribe()),
    )?;

    if let Ok(reason) = interrupt_rx.recv().await {
        match reason {
            Interrupted::UserInt => tracing::info!("exited per user request"),
            Interrupted::OsSigInt => tracing::info!("exited because of an os sig int"),
        }
    } else {
        tracing::warn!("exited because of an unexpected error");
    }

    Ok(())
}

/// Log to a file, the terminal belongs to the UI.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir).context("could not create the log directory")?;

    let log_file = std::fs::File::create(log_dir.join("poker-tui.log"))
        .context("could not create the log file")?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("poker_tui=info,comms=info,warn")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
