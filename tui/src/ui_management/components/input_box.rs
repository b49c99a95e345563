use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    prelude::{Backend, Rect},
    style::{Color, Style, Stylize},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::ComponentRender;

/// Single line text input. The cursor counts characters, not bytes.
#[derive(Debug, Default)]
pub struct InputBox {
    text: String,
    cursor_position: usize,
}

impl InputBox {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, new_text: &str) {
        self.text = String::from(new_text);
        self.cursor_position = self.char_count();
    }

    pub fn reset(&mut self) {
        self.cursor_position = 0;
        self.text.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor_position)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }

    fn enter_char(&mut self, new_char: char) {
        let idx = self.byte_index();
        self.text.insert(idx, new_char);
        self.cursor_position += 1;
    }

    fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }

        self.cursor_position -= 1;
        let idx = self.byte_index();
        self.text.remove(idx);
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char(to_insert) => self.enter_char(to_insert),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Left => self.cursor_position = self.cursor_position.saturating_sub(1),
            KeyCode::Right => {
                self.cursor_position = (self.cursor_position + 1).min(self.char_count())
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.char_count(),
            _ => {}
        }
    }
}

pub struct RenderProps<'a> {
    pub title: &'a str,
    pub placeholder: &'a str,
    pub area: Rect,
    pub border_color: Color,
    pub show_cursor: bool,
}

impl ComponentRender<RenderProps<'_>> for InputBox {
    fn render<B: Backend>(&self, frame: &mut Frame<B>, props: RenderProps<'_>) {
        let content = if self.text.is_empty() {
            Span::from(props.placeholder.to_string()).italic().dark_gray()
        } else {
            Span::from(self.text.clone()).fg(Color::Yellow)
        };

        let input = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(props.border_color))
                .title(props.title.to_string()),
        );
        frame.render_widget(input, props.area);

        if props.show_cursor {
            // one cell right of the left border, one line below the top border
            frame.set_cursor(
                props.area.x + self.cursor_position as u16 + 1,
                props.area.y + 1,
            )
        }
    }
}
