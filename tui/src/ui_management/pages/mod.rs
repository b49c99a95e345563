use crossterm::event::KeyEvent;
use ratatui::{prelude::Backend, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, ServerConnectionStatus, State};

use self::{connect_page::ConnectPage, poker_page::PokerPage};

use super::components::{Component, ComponentRender};

mod connect_page;
mod poker_page;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Route {
    Connect,
    Session,
}

impl Route {
    /// The session stays on screen while a dropped connection is retried
    fn for_state(state: &State) -> Self {
        match state.server_connection_status {
            ServerConnectionStatus::Connected { .. }
            | ServerConnectionStatus::Reconnecting { .. } => Route::Session,
            ServerConnectionStatus::Uninitialized
            | ServerConnectionStatus::Connecting
            | ServerConnectionStatus::Errored { .. } => Route::Connect,
        }
    }
}

/// Top level component, shows one page depending on the connection
pub struct AppRouter {
    route: Route,
    connect_page: ConnectPage,
    poker_page: PokerPage,
}

impl AppRouter {
    fn page(&self) -> &dyn Component {
        match self.route {
            Route::Connect => &self.connect_page,
            Route::Session => &self.poker_page,
        }
    }

    fn page_mut(&mut self) -> &mut dyn Component {
        match self.route {
            Route::Connect => &mut self.connect_page,
            Route::Session => &mut self.poker_page,
        }
    }
}

impl Component for AppRouter {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        AppRouter {
            route: Route::for_state(state),
            connect_page: ConnectPage::new(state, action_tx.clone()),
            poker_page: PokerPage::new(state, action_tx),
        }
    }

    // both pages keep up with the state so switching back and forth loses nothing
    fn move_with_state(self, state: &State) -> Self {
        AppRouter {
            route: Route::for_state(state),
            connect_page: self.connect_page.move_with_state(state),
            poker_page: self.poker_page.move_with_state(state),
        }
    }

    fn name(&self) -> &str {
        self.page().name()
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        self.page_mut().handle_key_event(key)
    }
}

impl ComponentRender<()> for AppRouter {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: ()) {
        match self.route {
            Route::Connect => self.connect_page.render(frame, props),
            Route::Session => self.poker_page.render(frame, props),
        }
    }
}
