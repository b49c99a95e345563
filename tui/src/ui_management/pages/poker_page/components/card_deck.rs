use comms::card::{Card, CARD_VALUES};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{prelude::*, widgets::*, Frame};
use tokio::sync::mpsc::UnboundedSender;

use crate::state_store::{action::Action, State};
use crate::ui_management::components::{
    usage::{HasUsageInfo, KeyBinding, UsageInfo},
    Component, ComponentRender,
};

use super::super::section::SectionActivation;

struct Props {
    selected_card: Option<Card>,
    can_vote: bool,
}

impl From<&State> for Props {
    fn from(state: &State) -> Self {
        Props {
            selected_card: state.selected_card,
            can_vote: state.has_joined(),
        }
    }
}

/// The row of estimate cards
pub struct CardDeck {
    action_tx: UnboundedSender<Action>,
    props: Props,
    //
    /// Card under the cursor while the deck is active
    hovered: Option<usize>,
}

impl CardDeck {
    fn hover_next(&mut self) {
        self.hovered = self.hovered.map(|idx| (idx + 1) % CARD_VALUES.len());
    }

    fn hover_previous(&mut self) {
        self.hovered = self
            .hovered
            .map(|idx| (idx + CARD_VALUES.len() - 1) % CARD_VALUES.len());
    }

    fn vote_hovered(&self) {
        let card = self.hovered.and_then(|idx| Card::deck().nth(idx));

        if let Some(card) = card {
            let _ = self.action_tx.send(Action::Vote { card });
        }
    }
}

impl Component for CardDeck {
    fn new(state: &State, action_tx: UnboundedSender<Action>) -> Self {
        Self {
            action_tx,
            props: Props::from(state),
            hovered: None,
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
        "Cards"
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Left => self.hover_previous(),
            KeyCode::Right => self.hover_next(),
            KeyCode::Enter if self.props.can_vote => self.vote_hovered(),
            _ => (),
        }
    }
}

impl SectionActivation for CardDeck {
    fn activate(&mut self) {
        self.hovered = Some(self.props.selected_card.map(Card::index).unwrap_or(0));
    }

    fn deactivate(&mut self) {
        self.hovered = None;
    }
}

pub struct RenderProps {
    pub area: Rect,
    pub border_color: Color,
}

impl ComponentRender<RenderProps> for CardDeck {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps) {
        let title = if self.props.can_vote {
            "Cards"
        } else {
            "Cards (join to vote)"
        };
        let deck_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(props.border_color))
            .title(title);
        let inner = deck_block.inner(props.area);
        frame.render_widget(deck_block, props.area);

        let card_count = CARD_VALUES.len() as u32;
        let slots = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, card_count); CARD_VALUES.len()])
            .split(inner);

        for (idx, (card, slot)) in Card::deck().zip(slots.iter()).enumerate() {
            let is_selected = self.props.selected_card == Some(card);
            let is_hovered = self.hovered == Some(idx);

            let card_style = match (is_selected, self.props.can_vote) {
                (true, _) => Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD),
                (false, true) => Style::default(),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            let border_style = if is_hovered {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let card_widget = Paragraph::new(card.to_string())
                .style(card_style)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(border_style),
                );
            frame.render_widget(card_widget, *slot);
        }
    }
}

impl HasUsageInfo for CardDeck {
    fn usage_info(&self) -> UsageInfo {
        if self.props.can_vote {
            UsageInfo {
                description: Some("Pick your estimate, you can change it until the round ends".into()),
                bindings: vec![
                    KeyBinding::new(&["Esc"], "to cancel"),
                    KeyBinding::new(&["←", "→"], "to move"),
                    KeyBinding::new(&["Enter"], "to vote"),
                ],
            }
        } else {
            UsageInfo {
                description: Some("You can not vote until you join the session".into()),
                bindings: vec![KeyBinding::new(&["Esc"], "to cancel")],
            }
        }
    }
}
