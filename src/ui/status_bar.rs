use std::sync::Arc;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::config::{GlobalAction, KeyResolver, NavAction};
use crate::ui::Keybinding;

const TITLE: &str = "Tour of Heroes";

const LOGO: &[&str] = &[
    r"   _  /\  _   ",
    r"  ( \/  \/ )  ",
    r"   \ HERO /   ",
    r"    \    /    ",
    r"     \  /     ",
];

/// Bottom bar with the current location, running work, key hints and the logo.
pub struct StatusBar {
    resolver: Arc<KeyResolver>,
}

impl StatusBar {
    pub const fn new(resolver: Arc<KeyResolver>) -> Self {
        Self { resolver }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        breadcrumbs: &[String],
        local_keybindings: &[Keybinding],
        activity: Option<&str>,
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(32),
                Constraint::Min(20),
                Constraint::Length(15),
            ])
            .split(inner_area);

        Self::render_location(frame, chunks[0], theme, breadcrumbs, activity);
        self.render_keybindings(frame, chunks[1], theme, local_keybindings);
        Self::render_logo(frame, chunks[2], theme);
    }

    fn render_location(
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        breadcrumbs: &[String],
        activity: Option<&str>,
    ) {
        let w = area.width as usize;
        let mut lines = vec![
            Line::from(Span::styled(
                TITLE,
                Style::default()
                    .fg(theme.highlight())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        for (depth, crumb) in breadcrumbs.iter().enumerate() {
            let indent = "  ".repeat(depth);
            let marker = if depth + 1 == breadcrumbs.len() { "▸ " } else { "  " };
            let style = if depth + 1 == breadcrumbs.len() {
                Style::default().fg(theme.text()).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.muted())
            };
            lines.push(Line::from(Span::styled(
                truncate_str(&format!("{indent}{marker}{crumb}"), w),
                style,
            )));
        }

        lines.push(Line::from(""));
        lines.push(match activity {
            Some(name) => Line::from(Span::styled(
                truncate_str(&format!("⟳ {name}"), w),
                Style::default().fg(theme.warning()),
            )),
            None => Line::from(Span::styled("● ready", Style::default().fg(theme.success()))),
        });

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_keybindings(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        local_keybindings: &[Keybinding],
    ) {
        let global_keybindings = self.global_keybindings();

        let hints: Vec<&Keybinding> = local_keybindings
            .iter()
            .filter(|kb| kb.hint)
            .chain(global_keybindings.iter().filter(|kb| kb.hint))
            .collect();

        if hints.is_empty() || area.height == 0 {
            return;
        }

        // Column widths follow the content so the separators line up.
        let max_key_w = hints.iter().map(|kb| kb.key.chars().count()).max().unwrap_or(1);
        let max_desc_w = hints
            .iter()
            .map(|kb| kb.description.chars().count())
            .max()
            .unwrap_or(1);
        let col_width = u16::try_from(max_key_w + 3 + max_desc_w + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = area.height as usize;

        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let col_idx = i / num_rows;
            if col_idx >= num_cols {
                break;
            }
            columns[col_idx].push(Line::from(vec![
                Span::styled(
                    format!("{:>width$}", kb.key, width = max_key_w),
                    Style::default().fg(theme.key()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.border())),
                Span::styled(kb.description.clone(), Style::default().fg(theme.subtext())),
            ]));
        }

        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(col_width); num_cols])
            .split(area);

        for (col_lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(col_lines), *col_area);
        }
    }

    fn render_logo(frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = Style::default()
            .fg(theme.accent())
            .add_modifier(Modifier::BOLD);
        let logo_lines: Vec<Line> = LOGO
            .iter()
            .map(|line| Line::from(Span::styled(*line, style)))
            .collect();
        frame.render_widget(Paragraph::new(logo_lines), area);
    }

    /// Keybindings available on every screen.
    pub fn global_keybindings(&self) -> Vec<Keybinding> {
        let r = &self.resolver;
        vec![
            Keybinding::hint(r.display_global(GlobalAction::Dashboard), "Dashboard"),
            Keybinding::hint(r.display_global(GlobalAction::Heroes), "Heroes"),
            Keybinding::hint(r.display_global(GlobalAction::Help), "Help"),
            Keybinding::hint(r.display_global(GlobalAction::Back), "Back"),
            Keybinding::new(r.display_global(GlobalAction::ClearMessages), "Clear messages"),
            Keybinding::new(r.display_global(GlobalAction::ResetData), "Reset data"),
            Keybinding::new(r.display_global(GlobalAction::Quit), "Quit"),
            Keybinding::new(r.display_nav(NavAction::Select), "Select"),
            Keybinding::new(
                format!(
                    "{}/{}",
                    r.display_nav(NavAction::Up),
                    r.display_nav(NavAction::Down)
                ),
                "Navigate",
            ),
        ]
    }
}

/// Truncate to `max_width` characters, adding "..." if cut.
fn truncate_str(s: &str, max_width: usize) -> String {
    let len = s.chars().count();
    if len <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Dr Nice", 10), "Dr Nice");
        assert_eq!(truncate_str("Dr IQ Magneta", 8), "Dr IQ...");
        assert_eq!(truncate_str("Magneta", 2), "Ma");
        assert_eq!(truncate_str("Éclair Éclair", 5), "Éc...");
    }

    #[test]
    fn test_global_keybindings_follow_config() {
        let bar = StatusBar::new(Arc::new(KeyResolver::default()));
        let bindings = bar.global_keybindings();
        let quit = bindings.iter().find(|kb| kb.description == "Quit").unwrap();
        assert_eq!(quit.key, "q");
        assert!(!quit.hint);
    }
}
