use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

/// Single-line editable text with a character-indexed cursor.
pub struct TextInput {
    text: String,
    cursor_position: usize,
    is_focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            cursor_position: 0,
            is_focused: false,
        }
    }

    pub fn with_text(text: &str) -> Self {
        let mut input = Self::new();
        input.set_text(text);
        input
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor_position = self.text.chars().count();
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.text.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let index = self.byte_index();
        self.text.remove(index);
    }

    pub fn delete_forward(&mut self) {
        if self.cursor_position < self.text.chars().count() {
            let index = self.byte_index();
            self.text.remove(index);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor_position = (self.cursor_position + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_position = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_position = 0;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, placeholder: &str) {
        let border_style = if self.is_focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        let (content, text_style) = if self.text.is_empty() {
            (placeholder, Style::default().fg(Color::DarkGray))
        } else {
            (self.text.as_str(), Style::default())
        };

        let paragraph = Paragraph::new(content).block(block).style(text_style);
        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            let cursor_y = area.y + 1;

            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: cursor_y,
                });
            }
        }
    }
}
