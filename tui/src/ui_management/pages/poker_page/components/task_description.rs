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
    task_description: String,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            task_description: state.task_description.clone(),
        }
    }
}

/// What the round is estimating. Only this terminal sees it.
pub struct TaskDescription {
    action_tx: UnboundedSender<Action>,
    props: Props,
    //
    input_box: InputBox,
    editing: bool,
}

impl Component for TaskDescription {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx,
            props: Props::from(state),
            //
            input_box: InputBox::default(),
            editing: false,
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
        "Task Description"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Enter {
            let _ = self.action_tx.send(Action::SetTaskDescription {
                text: self.input_box.text().trim().to_string(),
            });
        } else {
            self.input_box.handle_key_event(key);
        }
    }
}

impl SectionActivation for TaskDescription {
    fn activate(&mut self) {
        self.input_box.set_text(&self.props.task_description);
        self.editing = true;
    }

    fn deactivate(&mut self) {
        self.input_box.reset();
        self.editing = false;
    }
}

pub struct RenderProps {
    pub area: Rect,
    pub border_color: Color,
}

impl ComponentRender<RenderProps> for TaskDescription {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        if self.editing {
            return self.input_box.render(
                frame,
                input_box::RenderProps {
                    title: "Task",
                    placeholder: "What are we estimating?",
                    area: props.area,
                    border_color: props.border_color,
                    show_cursor: true,
                },
            );
        }

        let content = if self.props.task_description.is_empty() {
            Span::from("No task described yet").italic().dark_gray()
        } else {
            Span::from(self.props.task_description.clone())
        };

        let description = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(props.border_color))
                .title("Task"),
        );
        frame.render_widget(description, props.area);
    }
}

impl HasUsageInfo for TaskDescription {
    fn usage_info(&self) -> UsageInfo {
        UsageInfo {
            description: Some("Describe the task being estimated".into()),
            bindings: vec![
                KeyBinding::new(&["Esc"], "to cancel"),
                KeyBinding::new(&["Enter"], "to save"),
            ],
        }
    }
}
