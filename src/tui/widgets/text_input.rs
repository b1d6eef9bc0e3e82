//! # Text Input
//!
//! Single-line editable field rendered as `label  value` on one row.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::ui;

/// Editable single-line value. The cursor is a character index, so
/// multi-byte input moves and deletes whole characters.
#[derive(Debug, Clone)]
pub struct TextInput {
    label: String,
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
        }
    }

    /// Sets the value and puts the cursor at its end.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.len();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Inserts pasted text at the cursor; line breaks become spaces.
    pub fn insert_text(&mut self, text: &str) {
        let flat: String = text
            .chars()
            .map(|c| if matches!(c, '\n' | '\r') { ' ' } else { c })
            .collect();
        let at = self.byte_index(self.cursor);
        self.value.insert_str(at, &flat);
        self.cursor += flat.chars().count();
    }

    fn remove_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    /// Applies an editing key. Returns `false` for keys the field ignores,
    /// leaving them to the enclosing screen.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('u') if ctrl => {
                self.value.clear();
                self.cursor = 0;
            }
            KeyCode::Char('w') if ctrl => {
                let chars: Vec<char> = self.value.chars().collect();
                let mut start = self.cursor;
                while start > 0 && chars[start - 1] == ' ' {
                    start -= 1;
                }
                while start > 0 && chars[start - 1] != ' ' {
                    start -= 1;
                }
                for _ in start..self.cursor {
                    self.remove_before_cursor();
                }
            }
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => self.remove_before_cursor(),
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }

    /// Renders the row with the label padded to `label_width` columns.
    pub fn render(&self, area: Rect, buf: &mut Buffer, label_width: usize, focused: bool) {
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(
            format!("{} ", ui::pad(&self.label, label_width)),
            label_style,
        )];

        if focused {
            let at = self.byte_index(self.cursor);
            let (before, rest) = self.value.split_at(at);
            let mut rest = rest.chars();
            let under = rest.next().unwrap_or(' ');
            spans.push(Span::raw(before.to_string()));
            spans.push(Span::styled(
                under.to_string(),
                Style::default().bg(Color::White).fg(Color::Black),
            ));
            spans.push(Span::raw(rest.collect::<String>()));
        } else {
            spans.push(Span::raw(self.value.clone()));
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
