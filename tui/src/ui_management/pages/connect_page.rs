use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, ServerConnectionStatus, State};

use crate::ui_management::components::{Component, ComponentRender};

struct Props {
    server_url: String,
    connection_status: ServerConnectionStatus,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            server_url: state.server_url.clone(),
            connection_status: state.server_connection_status.clone(),
        }
    }
}

/// ConnectPage opens the first connection to the session server
pub struct ConnectPage {
    /// Action sender
    action_tx: UnboundedSender<Action>,
    /// State Mapped ConnectPage Props
    props: Props,
}

impl ConnectPage {
    fn status_line(&self) -> Line<'static> {
        match &self.props.connection_status {
            ServerConnectionStatus::Connecting => Line::from("Connecting...".italic()),
            ServerConnectionStatus::Errored { err } => Line::from(vec![
                "Could not connect: ".red().bold(),
                Span::from(err.clone()).red(),
            ]),
            _ => Line::from(vec![
                "Press ".into(),
                "<Enter>".bold(),
                " to connect, ".into(),
                "<q>".bold(),
                " to quit.".into(),
            ]),
        }
    }
}

impl Component for ConnectPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            action_tx,
            props: Props::from(state),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        ConnectPage {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Connect Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Enter
                if self.props.connection_status != ServerConnectionStatus::Connecting =>
            {
                let _ = self.action_tx.send(Action::ConnectToServerRequest {
                    addr: self.props.server_url.clone(),
                });
            }
            KeyCode::Char('q') => {
                let _ = self.action_tx.send(Action::Exit);
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let _ = self.action_tx.send(Action::Exit);
            }
            _ => {}
        }
    }
}

impl ComponentRender<()> for ConnectPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [_, vertical_centered, _] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Ratio(1, 3),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 3),
                ]
                .as_ref(),
            )
            .split(frame.size())
        else {
            panic!("The main layout should have 3 chunks")
        };

        let [_, both_centered, _] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                [
                    Constraint::Ratio(1, 4),
                    Constraint::Min(1),
                    Constraint::Ratio(1, 4),
                ]
                .as_ref(),
            )
            .split(vertical_centered)
        else {
            panic!("The horizontal layout should have 3 chunks")
        };

        let [container_title, container_addr, container_status] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(2),
                    Constraint::Length(3),
                    Constraint::Length(3),
                ]
                .as_ref(),
            )
            .split(both_centered)
        else {
            panic!("The centered layout should have 3 chunks")
        };

        let title = Paragraph::new(Line::from("Planning Poker".bold()))
            .alignment(Alignment::Center);
        frame.render_widget(title, container_title);

        let addr = Paragraph::new(Text::from(self.props.server_url.as_str()))
            .block(Block::default().borders(Borders::ALL).title("Server"));
        frame.render_widget(addr, container_addr);

        let status = Paragraph::new(self.status_line()).wrap(Wrap { trim: true });
        frame.render_widget(status, container_status);
    }
}
