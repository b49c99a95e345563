use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};
use crate::ui_management::components::{
    input_box::{self, InputBox},
    usage::{HasUsageInfo, KeyBinding, UsageInfo},
    Component, ComponentRender,
};

use super::super::section::SectionActivation;

struct Props {
    /// Name this client joined under, once the server confirmed it
    joined_as: Option<String>,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            joined_as: state.username.clone().filter(|_| state.has_joined()),
        }
    }
}

pub struct NameInput {
    action_tx: UnboundedSender<Action>,
    /// State Mapped NameInput Props
    props: Props,
    // Internal State for the Component
    input_box: InputBox,
}

impl NameInput {
    fn submit_name(&mut self) {
        if self.input_box.is_empty() {
            return;
        }

        let _ = self.action_tx.send(Action::Join {
            name: String::from(self.input_box.text()),
        });

        self.input_box.reset();
    }
}

impl Component for NameInput {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx,
            props: Props::from(state),
            //
            input_box: InputBox::default(),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        Self {
            props: Props::from(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Name Input"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press || self.props.joined_as.is_some() {
            return;
        }

        if key.code == KeyCode::Enter {
            self.submit_name();
        } else {
            self.input_box.handle_key_event(key);
        }
    }
}

impl SectionActivation for NameInput {
    fn activate(&mut self) {}

    fn deactivate(&mut self) {
        self.input_box.reset();
    }
}

pub struct RenderProps {
    pub area: Rect,
    pub border_color: Color,
    pub show_cursor: bool,
}

impl ComponentRender<RenderProps> for NameInput {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        match self.props.joined_as.as_ref() {
            Some(name) => {
                let joined = Paragraph::new(Line::from(vec![
                    "Joined as ".into(),
                    Span::from(name.clone()).bold(),
                ]))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(props.border_color))
                        .title("Name"),
                );
                frame.render_widget(joined, props.area);
            }
            None => self.input_box.render(
                frame,
                input_box::RenderProps {
                    title: "Name",
                    placeholder: "Press e to enter your name",
                    area: props.area,
                    border_color: props.border_color,
                    show_cursor: props.show_cursor,
                },
            ),
        }
    }
}

impl HasUsageInfo for NameInput {
    fn usage_info(&self) -> UsageInfo {
        match self.props.joined_as.as_ref() {
            Some(name) => UsageInfo {
                description: Some(format!("You are in the session as {}", name)),
                bindings: vec![KeyBinding::new(&["Esc"], "to go back")],
            },
            None => UsageInfo {
                description: Some("Type the name the others will see".into()),
                bindings: vec![
                    KeyBinding::new(&["Esc"], "to cancel"),
                    KeyBinding::new(&["Enter"], "to join"),
                ],
            },
        }
    }
}
