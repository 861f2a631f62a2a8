use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::Theme;
use crate::ui::{Component, EventResult, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    /// The value was edited.
    Changed(String),
    Submitted(String),
    Cancelled,
}

/// Single-line text input.
///
/// Renders either inline inside the given area or as a centered popup.
pub struct TextInput {
    label: String,
    value: String,
    /// Cursor position in characters, not bytes.
    cursor: usize,
    placeholder: Option<String>,
    popup: bool,
    focused: bool,
}

impl TextInput {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: String::new(),
            cursor: 0,
            placeholder: None,
            popup: false,
            focused: true,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self.cursor = self.char_count();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Render as a centered popup over whatever is below.
    pub const fn popup(mut self) -> Self {
        self.popup = true;
        self
    }

    #[cfg(test)]
    pub fn value(&self) -> &str {
        &self.value
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn delete_char_before_cursor(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    fn delete_char_at_cursor(&mut self) -> bool {
        if self.cursor >= self.char_count() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
        true
    }

    fn delete_word_before_cursor(&mut self) -> bool {
        let chars: Vec<char> = self.value.chars().collect();
        let mut start = self.cursor;
        while start > 0 && chars[start - 1] == ' ' {
            start -= 1;
        }
        while start > 0 && chars[start - 1] != ' ' {
            start -= 1;
        }
        if start == self.cursor {
            return false;
        }
        let (from, to) = (self.byte_index(start), self.byte_index(self.cursor));
        self.value.drain(from..to);
        self.cursor = start;
        true
    }

    fn clear_line(&mut self) -> bool {
        let had_text = !self.value.is_empty();
        self.value.clear();
        self.cursor = 0;
        had_text
    }

    fn changed(&self, did_change: bool) -> EventResult<TextInputEvent> {
        if did_change {
            TextInputEvent::Changed(self.value.clone()).into()
        } else {
            EventResult::Consumed
        }
    }

    fn input_line(&self, theme: &Theme) -> Line<'static> {
        let input_style = Style::default().fg(theme.text());
        let cursor_style = Style::default()
            .fg(theme.base())
            .bg(theme.text())
            .add_modifier(Modifier::BOLD);
        let placeholder_style = Style::default().fg(theme.muted());

        if self.value.is_empty() {
            let mut spans = Vec::new();
            if self.focused {
                spans.push(Span::styled(" ", cursor_style));
            }
            if let Some(placeholder) = &self.placeholder {
                spans.push(Span::styled(placeholder.clone(), placeholder_style));
            }
            return Line::from(spans);
        }

        if !self.focused {
            return Line::from(Span::styled(self.value.clone(), input_style));
        }

        let before: String = self.value.chars().take(self.cursor).collect();
        let mut rest = self.value.chars().skip(self.cursor);
        let at_cursor = rest.next().unwrap_or(' ');
        let after: String = rest.collect();

        Line::from(vec![
            Span::styled(before, input_style),
            Span::styled(at_cursor.to_string(), cursor_style),
            Span::styled(after, input_style),
        ])
    }
}

impl Component for TextInput {
    type Output = TextInputEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        Ok(match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => TextInputEvent::Submitted(self.value.clone()).into(),
            (KeyCode::Esc, _) => TextInputEvent::Cancelled.into(),

            (KeyCode::Backspace, KeyModifiers::ALT) | (KeyCode::Char('w'), KeyModifiers::CONTROL) => {
                let did_change = self.delete_word_before_cursor();
                self.changed(did_change)
            }
            (KeyCode::Backspace, _) => {
                let did_change = self.delete_char_before_cursor();
                self.changed(did_change)
            }
            (KeyCode::Delete, _) => {
                let did_change = self.delete_char_at_cursor();
                self.changed(did_change)
            }
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                let did_change = self.clear_line();
                self.changed(did_change)
            }

            (KeyCode::Left, _) => {
                self.cursor = self.cursor.saturating_sub(1);
                EventResult::Consumed
            }
            (KeyCode::Right, _) => {
                self.cursor = (self.cursor + 1).min(self.char_count());
                EventResult::Consumed
            }
            (KeyCode::Home, _) | (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
                self.cursor = 0;
                EventResult::Consumed
            }
            (KeyCode::End, _) | (KeyCode::Char('e'), KeyModifiers::CONTROL) => {
                self.cursor = self.char_count();
                EventResult::Consumed
            }

            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                self.insert_char(c);
                self.changed(true)
            }

            // Swallow everything else so typing never triggers shortcuts.
            _ => EventResult::Consumed,
        })
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let area = if self.popup {
            let popup_area = area.centered(Constraint::Percentage(50), Constraint::Length(3));
            frame.render_widget(Clear, popup_area);
            popup_area
        } else {
            area
        };

        let title = if self.popup {
            format!(" {} (Enter to confirm, Esc to cancel) ", self.label)
        } else {
            format!(" {} ", self.label)
        };
        let border_color = if self.focused {
            theme.highlight()
        } else {
            theme.border()
        };

        let block = Block::default()
            .title(title)
            .title_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme.base()));

        frame.render_widget(Paragraph::new(self.input_line(theme)).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut TextInput, text: &str) {
        for c in text.chars() {
            input.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    #[test]
    fn test_typing_emits_changes() {
        let mut input = TextInput::new("Search");
        let result = input.handle_key(key(KeyCode::Char('m'))).unwrap();
        assert_eq!(result, EventResult::Event(TextInputEvent::Changed("m".to_string())));

        type_str(&mut input, "ag");
        assert_eq!(input.value(), "mag");
    }

    #[test]
    fn test_submit_and_cancel() {
        let mut input = TextInput::new("Name").with_value("Narco");
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)).unwrap(),
            EventResult::Event(TextInputEvent::Submitted("Narco".to_string()))
        );
        assert_eq!(
            input.handle_key(key(KeyCode::Esc)).unwrap(),
            EventResult::Event(TextInputEvent::Cancelled)
        );
    }

    #[test]
    fn test_editing_in_the_middle() {
        let mut input = TextInput::new("Name").with_value("Dr Nce");
        input.handle_key(key(KeyCode::Left)).unwrap();
        input.handle_key(key(KeyCode::Left)).unwrap();
        type_str(&mut input, "i");
        assert_eq!(input.value(), "Dr Nice");

        input.handle_key(key(KeyCode::Home)).unwrap();
        input.handle_key(key(KeyCode::Delete)).unwrap();
        assert_eq!(input.value(), "r Nice");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut input = TextInput::new("Name");
        type_str(&mut input, "Élan");
        input.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(input.value(), "Éla");
        input.handle_key(key(KeyCode::Home)).unwrap();
        input.handle_key(key(KeyCode::Right)).unwrap();
        type_str(&mut input, "é");
        assert_eq!(input.value(), "Ééla");
    }

    #[test]
    fn test_backspace_on_empty_is_not_a_change() {
        let mut input = TextInput::new("Search");
        assert_eq!(
            input.handle_key(key(KeyCode::Backspace)).unwrap(),
            EventResult::Consumed
        );
    }

    #[test]
    fn test_delete_word() {
        let mut input = TextInput::new("Name").with_value("Dr Nice ");
        let result = input
            .handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT))
            .unwrap();
        assert_eq!(result, EventResult::Event(TextInputEvent::Changed("Dr ".to_string())));
    }

    #[test]
    fn test_clear_line() {
        let mut input = TextInput::new("Name").with_value("Magma");
        input
            .handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL))
            .unwrap();
        assert_eq!(input.value(), "");
    }
}
