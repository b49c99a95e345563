use comms::mirror::VoteStatus;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, ServerConnectionStatus, State};
use crate::ui_management::components::{
    usage::{HasUsageInfo, KeyBinding, UsageInfo},
    Component, ComponentRender,
};

use super::{
    components::{
        card_deck::{self, CardDeck},
        name_input::{self, NameInput},
        task_description::{self, TaskDescription},
    },
    section::SectionActivation,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Section {
    NameInput,
    TaskDescription,
    CardDeck,
}

impl Section {
    const ALL: [Section; 3] = [Section::NameInput, Section::TaskDescription, Section::CardDeck];

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|section| *section == self)
            .unwrap_or_default()
    }

    fn next(self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

struct Props {
    /// Participants in join order with what their row shows
    statuses: Vec<(String, VoteStatus)>,
    /// Name this client joined under
    username: Option<String>,
    /// Average of the round, once everybody voted
    average_vote: Option<f64>,
    votes_cast: usize,
    connection_status: ServerConnectionStatus,
    /// Notices, oldest first
    notices: Vec<String>,
    timer: usize,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            statuses: state.mirror.statuses(),
            username: state.username.clone().filter(|_| state.has_joined()),
            average_vote: state.mirror.average_vote(),
            votes_cast: state.mirror.votes_cast(),
            connection_status: state.server_connection_status.clone(),
            notices: state.notices.asc_iter().cloned().collect(),
            timer: state.timer,
        }
    }
}

const DEFAULT_HOVERED_SECTION: Section = Section::NameInput;

/// PokerPage shows the session and takes the user's intents
pub struct PokerPage {
    /// Action sender
    action_tx: UnboundedSender<Action>,
    /// State Mapped PokerPage Props
    props: Props,
    // Internal State
    /// Currently active section, handling input
    active_section: Option<Section>,
    /// Section that is currently hovered
    last_hovered_section: Section,
    // Child Components
    name_input: NameInput,
    task_description: TaskDescription,
    card_deck: CardDeck,
}

impl PokerPage {
    fn get_component_for_section(&self, section: Section) -> &dyn Component {
        match section {
            Section::NameInput => &self.name_input,
            Section::TaskDescription => &self.task_description,
            Section::CardDeck => &self.card_deck,
        }
    }

    fn get_component_for_section_mut(&mut self, section: Section) -> &mut dyn Component {
        match section {
            Section::NameInput => &mut self.name_input,
            Section::TaskDescription => &mut self.task_description,
            Section::CardDeck => &mut self.card_deck,
        }
    }

    fn get_section_activation_for_section(
        &mut self,
        section: Section,
    ) -> &mut dyn SectionActivation {
        match section {
            Section::NameInput => &mut self.name_input,
            Section::TaskDescription => &mut self.task_description,
            Section::CardDeck => &mut self.card_deck,
        }
    }

    fn calculate_border_color(&self, section: Section) -> Color {
        match (self.active_section, self.last_hovered_section) {
            (Some(active_section), _) if active_section == section => Color::Yellow,
            (_, last_hovered_section) if last_hovered_section == section => Color::Blue,
            _ => Color::Reset,
        }
    }

    fn activate_section(&mut self, section: Section) {
        self.active_section = Some(section);
        self.get_section_activation_for_section(section).activate();
    }

    fn disable_section(&mut self, section: Section) {
        self.get_section_activation_for_section(section).deactivate();

        self.active_section = None;
    }

    fn send(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }
}

impl Component for PokerPage {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self
    where
        Self: Sized,
    {
        PokerPage {
            action_tx: action_tx.clone(),
            props: Props::from(state),
            // internal component state
            active_section: None,
            last_hovered_section: DEFAULT_HOVERED_SECTION,
            // child components
            name_input: NameInput::new(state, action_tx.clone()),
            task_description: TaskDescription::new(state, action_tx.clone()),
            card_deck: CardDeck::new(state, action_tx),
        }
    }

    fn move_with_state(self, state: &State) -> Self
    where
        Self: Sized,
    {
        PokerPage {
            props: Props::from(state),
            // propogate the update to the child components
            name_input: self.name_input.move_with_state(state),
            task_description: self.task_description.move_with_state(state),
            card_deck: self.card_deck.move_with_state(state),
            ..self
        }
    }

    fn name(&self) -> &str {
        "Poker Page"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.active_section {
            None => match key.code {
                KeyCode::Char('e') | KeyCode::Enter => {
                    self.activate_section(self.last_hovered_section)
                }
                KeyCode::Left | KeyCode::Up => {
                    self.last_hovered_section = self.last_hovered_section.previous()
                }
                KeyCode::Right | KeyCode::Down => {
                    self.last_hovered_section = self.last_hovered_section.next()
                }
                KeyCode::Char('r') => self.send(Action::Reset),
                KeyCode::Char('l') => self.send(Action::Leave),
                KeyCode::Char('q') => self.send(Action::Exit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.send(Action::Exit)
                }
                _ => {}
            },
            Some(section) => {
                if key.code == KeyCode::Esc {
                    return self.disable_section(section);
                }

                self.get_component_for_section_mut(section)
                    .handle_key_event(key);

                // text inputs are done once submitted, the deck stays open to change the vote
                match section {
                    Section::NameInput | Section::TaskDescription if key.code == KeyCode::Enter => {
                        self.disable_section(section)
                    }
                    _ => (),
                }
            }
        }
    }
}

fn calculate_list_offset(height: u16, items_len: usize) -> usize {
    // go back by (container height - 2 for borders) to get the offset
    items_len.saturating_sub(height.saturating_sub(2) as usize)
}

impl PokerPage {
    fn participant_items(&self) -> Vec<ListItem<'static>> {
        self.props
            .statuses
            .iter()
            .map(|(name, status)| {
                let status_span = match status {
                    VoteStatus::Waiting => Span::from("thinking...").italic().dark_gray(),
                    VoteStatus::Voted => Span::from("voted").green(),
                    VoteStatus::Revealed(card) => Span::from(card.to_string()).bold().yellow(),
                };

                let name_span = Span::from(format!("{:<20}", name));
                let name_span = if self.props.username.as_deref() == Some(name.as_str()) {
                    name_span.bold()
                } else {
                    name_span
                };

                ListItem::new(Line::from(vec![name_span, status_span]))
            })
            .collect()
    }

    fn result_line(&self) -> Line<'static> {
        match self.props.average_vote {
            Some(average) => Line::from(vec![
                "Everybody voted, average: ".into(),
                Span::from(format!("{:.1}", average)).bold().green(),
            ]),
            None if self.props.statuses.is_empty() => {
                Line::from("Nobody joined yet".italic())
            }
            None => Line::from(format!(
                "Waiting for votes ({}/{})",
                self.props.votes_cast,
                self.props.statuses.len()
            )),
        }
    }

    fn connection_line(&self) -> Line<'static> {
        match &self.props.connection_status {
            ServerConnectionStatus::Connected { addr } => Line::from(vec![
                "Connected ".green().bold(),
                Span::from(format!("to {}", addr)),
            ]),
            ServerConnectionStatus::Reconnecting { err, .. } => Line::from(vec![
                "Disconnected ".red().bold(),
                Span::from(format!("({}), reconnecting...", err)).red(),
            ]),
            _ => Line::from("Not connected".dark_gray()),
        }
    }
}

impl ComponentRender<()> for PokerPage {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, _props: ()) {
        let [left, right] = *Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)].as_ref())
            .split(frame.size())
        else {
            panic!("The main layout should have 2 chunks")
        };

        let [container_name, container_task, container_cards, container_result, container_participants] =
            *Layout::default()
                .direction(Direction::Vertical)
                .constraints(
                    [
                        Constraint::Length(3),
                        Constraint::Length(3),
                        Constraint::Length(5),
                        Constraint::Length(3),
                        Constraint::Min(3),
                    ]
                    .as_ref(),
                )
                .split(left)
        else {
            panic!("The left layout should have 5 chunks")
        };

        self.name_input.render(
            frame,
            name_input::RenderProps {
                area: container_name,
                border_color: self.calculate_border_color(Section::NameInput),
                show_cursor: self.active_section == Some(Section::NameInput),
            },
        );

        self.task_description.render(
            frame,
            task_description::RenderProps {
                area: container_task,
                border_color: self.calculate_border_color(Section::TaskDescription),
            },
        );

        self.card_deck.render(
            frame,
            card_deck::RenderProps {
                area: container_cards,
                border_color: self.calculate_border_color(Section::CardDeck),
            },
        );

        let result = Paragraph::new(self.result_line())
            .block(Block::default().borders(Borders::ALL).title("Result"));
        frame.render_widget(result, container_result);

        let participants = List::new(self.participant_items()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Participants ({})", self.props.statuses.len())),
        );
        frame.render_widget(participants, container_participants);

        let [container_session, container_notices, container_usage] = *Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(5),
                    Constraint::Min(3),
                    Constraint::Length(9),
                ]
                .as_ref(),
            )
            .split(right)
        else {
            panic!("The right layout should have 3 chunks")
        };

        let user_line = match self.props.username.as_ref() {
            Some(name) => Line::from(format!("User: {}", name)),
            None => Line::from("User: not joined".italic()),
        };
        let session_info = Paragraph::new(Text::from(vec![
            self.connection_line(),
            user_line,
            Line::from(format!("Session open for: {} secs", self.props.timer)),
        ]))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Session"));
        frame.render_widget(session_info, container_session);

        let notice_offset =
            calculate_list_offset(container_notices.height, self.props.notices.len());
        let notices = List::new(
            self.props
                .notices
                .iter()
                .skip(notice_offset)
                .map(|notice| ListItem::new(Line::from(notice.clone())))
                .collect::<Vec<ListItem>>(),
        )
        .block(Block::default().borders(Borders::ALL).title("Notices"));
        frame.render_widget(notices, container_notices);

        let usage = Paragraph::new(self.usage_info().to_text())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Usage"));
        frame.render_widget(usage, container_usage);
    }
}

impl HasUsageInfo for PokerPage {
    fn usage_info(&self) -> UsageInfo {
        if let Some(section) = self.active_section {
            let handler: &dyn HasUsageInfo = match section {
                Section::NameInput => &self.name_input,
                Section::TaskDescription => &self.task_description,
                Section::CardDeck => &self.card_deck,
            };

            handler.usage_info()
        } else {
            UsageInfo {
                description: Some("Select a widget".into()),
                bindings: vec![
                    KeyBinding::new(&["q"], "to exit"),
                    KeyBinding::new(&["←", "→"], "to hover widgets"),
                    KeyBinding::new(
                        &["e"],
                        format!(
                            "to activate {}",
                            self.get_component_for_section(self.last_hovered_section)
                                .name()
                        ),
                    ),
                    KeyBinding::new(&["r"], "to start a new round"),
                    KeyBinding::new(&["l"], "to leave the session"),
                ],
            }
        }
    }
}
