use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::prelude::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, List as RatatuiList, ListItem, ListState, Paragraph};

use crate::Theme;
use crate::config::{KeyResolver, NavAction};
use crate::ui::{Component, EventResult, Result};

const PAGE_STEP: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent<T> {
    Changed(T),
    Activated(T),
}

pub trait ListRow {
    fn render_row(&self, theme: &Theme) -> ListItem<'static>;
}

/// Bordered, keyboard-navigable list.
pub struct List<T: ListRow + Clone> {
    title: String,
    items: Vec<T>,
    state: ListState,
    empty_text: String,
    focused: bool,
    resolver: Arc<KeyResolver>,
}

impl<T: ListRow + Clone> List<T> {
    pub fn new(title: impl Into<String>, items: Vec<T>, resolver: Arc<KeyResolver>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self {
            title: title.into(),
            items,
            state,
            empty_text: "Nothing here".to_string(),
            focused: true,
            resolver,
        }
    }

    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_empty_text(&mut self, text: impl Into<String>) {
        self.empty_text = text.into();
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.clamp_selection();
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.clamp_selection();
    }

    /// Remove every item matching `predicate`, keeping the cursor in range.
    pub fn remove_where(&mut self, predicate: impl Fn(&T) -> bool) {
        self.items.retain(|item| !predicate(item));
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.items.is_empty() {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= self.items.len() {
                self.state.select(Some(self.items.len() - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn select_index(&mut self, index: usize) {
        if !self.items.is_empty() {
            self.state.select(Some(index.min(self.items.len() - 1)));
        }
    }

    fn get_change_event(&self, before: Option<usize>) -> EventResult<ListEvent<T>> {
        if let Some(selected) = self.state.selected()
            && Some(selected) != before
            && let Some(item) = self.items.get(selected)
        {
            return ListEvent::Changed(item.clone()).into();
        }
        EventResult::Consumed
    }

    fn block(&self, theme: &Theme) -> Block<'static> {
        let border_color = if self.focused {
            theme.highlight()
        } else {
            theme.border()
        };
        Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
    }
}

impl<T: ListRow + Clone> Component for List<T> {
    type Output = ListEvent<T>;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        let before = self.state.selected();
        let current = before.unwrap_or(0);

        if self.resolver.matches_nav(&key, NavAction::Down) {
            self.select_index(before.map_or(0, |i| i + 1));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Up) {
            self.select_index(current.saturating_sub(1));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Home) {
            self.select_index(0);
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::End) {
            self.select_index(usize::MAX);
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageDown) {
            self.select_index(before.map_or(0, |i| i + PAGE_STEP));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::PageUp) {
            self.select_index(current.saturating_sub(PAGE_STEP));
            return Ok(self.get_change_event(before));
        }
        if self.resolver.matches_nav(&key, NavAction::Select) {
            if let Some(item) = self.selected() {
                return Ok(ListEvent::Activated(item.clone()).into());
            }
            return Ok(EventResult::Ignored);
        }

        Ok(EventResult::Ignored)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = self.block(theme);

        if self.items.is_empty() {
            let placeholder = Paragraph::new(self.empty_text.clone())
                .style(Style::default().fg(theme.muted()))
                .block(block);
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem> = self.items.iter().map(|i| i.render_row(theme)).collect();

        let list = RatatuiList::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(theme.selection_bg())
                    .fg(theme.highlight())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        frame.render_stateful_widget(list, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row(&'static str);

    impl ListRow for Row {
        fn render_row(&self, _theme: &Theme) -> ListItem<'static> {
            ListItem::new(self.0)
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list(items: &[&'static str]) -> List<Row> {
        List::new(
            "Rows",
            items.iter().copied().map(Row).collect(),
            Arc::new(KeyResolver::default()),
        )
    }

    #[test]
    fn test_navigation_emits_changes() {
        let mut list = list(&["a", "b", "c"]);
        assert_eq!(list.selected(), Some(&Row("a")));

        let result = list.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(result, EventResult::Event(ListEvent::Changed(Row("b"))));

        let result = list.handle_key(key(KeyCode::End)).unwrap();
        assert_eq!(result, EventResult::Event(ListEvent::Changed(Row("c"))));
    }

    #[test]
    fn test_navigation_stops_at_the_edges() {
        let mut list = list(&["a", "b"]);
        assert_eq!(list.handle_key(key(KeyCode::Up)).unwrap(), EventResult::Consumed);

        list.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(list.handle_key(key(KeyCode::Down)).unwrap(), EventResult::Consumed);
        assert_eq!(list.selected(), Some(&Row("b")));
    }

    #[test]
    fn test_select_activates_current_row() {
        let mut list = list(&["a", "b"]);
        list.handle_key(key(KeyCode::Char('j'))).unwrap();
        let result = list.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(result, EventResult::Event(ListEvent::Activated(Row("b"))));
    }

    #[test]
    fn test_select_on_empty_list_is_ignored() {
        let mut list = list(&[]);
        assert_eq!(list.handle_key(key(KeyCode::Enter)).unwrap(), EventResult::Ignored);
    }

    #[test]
    fn test_remove_keeps_selection_in_range() {
        let mut list = list(&["a", "b", "c"]);
        list.handle_key(key(KeyCode::End)).unwrap();
        list.remove_where(|row| row.0 == "c");
        assert_eq!(list.selected(), Some(&Row("b")));

        list.remove_where(|_| true);
        assert_eq!(list.selected(), None);

        list.push(Row("d"));
        assert_eq!(list.selected(), Some(&Row("d")));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut list = list(&["a"]);
        assert_eq!(list.handle_key(key(KeyCode::Char('z'))).unwrap(), EventResult::Ignored);
    }
}
