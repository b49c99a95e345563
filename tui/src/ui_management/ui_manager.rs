use std::{
    io::{self, Stdout},
    time::Duration,
};

use anyhow::Context;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::sync::{
    broadcast,
    mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use tokio_stream::StreamExt;
use tracing::debug;

use crate::{
    state_store::{action::Action, State},
    termination::Interrupted,
    ui_management::components::{Component, ComponentRender},
};

use super::pages::AppRouter;

/// Redraw at least this often so the session timer keeps moving
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Raw mode and the alternate screen for as long as it lives.
/// Dropping it hands the terminal back, also when the loop bails out with an error.
struct RawTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl RawTerminal {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("could not enable raw mode")?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("could not enter the alternate screen")?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(RawTerminal { terminal })
    }

    fn draw(&mut self, app_router: &AppRouter) -> anyhow::Result<()> {
        self.terminal
            .draw(|frame| app_router.render(frame, ()))
            .context("could not render to the terminal")?;

        Ok(())
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let restored = disable_raw_mode()
            .and_then(|_| execute!(self.terminal.backend_mut(), LeaveAlternateScreen))
            .and_then(|_| self.terminal.show_cursor());

        if let Err(err) = restored {
            debug!("could not restore the terminal: {}", err);
        }
    }
}

/// Renders the state it receives and turns key presses into actions
pub struct UiManager {
    action_tx: UnboundedSender<Action>,
}

impl UiManager {
    pub fn new() -> (Self, UnboundedReceiver<Action>) {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        (UiManager { action_tx }, action_rx)
    }

    pub async fn main_loop(
        self,
        mut state_rx: UnboundedReceiver<State>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        let first_state = state_rx
            .recv()
            .await
            .context("state store stopped before the first state")?;
        let mut app_router = AppRouter::new(&first_state, self.action_tx);

        let mut raw_terminal = RawTerminal::enter()?;
        let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
        let mut terminal_events = EventStream::new();

        loop {
            raw_terminal.draw(&app_router)?;

            tokio::select! {
                Ok(interrupted) = interrupt_rx.recv() => return Ok(interrupted),
                Some(state) = state_rx.recv() => {
                    app_router = app_router.move_with_state(&state);
                },
                terminal_event = terminal_events.next() => match terminal_event {
                    Some(Ok(Event::Key(key))) => app_router.handle_key_event(key),
                    // resizes and the like only need the redraw at the top of the loop
                    Some(Ok(_)) => (),
                    Some(Err(err)) => return Err(err).context("could not read terminal input"),
                    None => return Ok(Interrupted::UserInt),
                },
                _ = redraw.tick() => (),
            }
        }
    }
}
