use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::messages::MessageLog;
use crate::ui::Component;

/// Most lines shown at once; older entries scroll off the top.
const MAX_VISIBLE: usize = 6;

/// Bottom panel echoing the [`MessageLog`].
pub struct MessagesPanel {
    log: MessageLog,
}

impl MessagesPanel {
    pub const fn new(log: MessageLog) -> Self {
        Self { log }
    }

    /// Rows the panel wants, borders included. Zero hides it.
    pub fn height(&self) -> u16 {
        if self.log.is_empty() {
            return 0;
        }
        let lines = self.log.len().min(MAX_VISIBLE);
        u16::try_from(lines + 2).unwrap_or(u16::MAX)
    }

    fn line_style(message: &str, theme: &Theme) -> Style {
        if message.contains(" failed: ") {
            Style::default().fg(theme.error())
        } else {
            Style::default().fg(theme.subtext())
        }
    }
}

impl Component for MessagesPanel {
    type Output = ();

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let messages = self.log.messages();
        if messages.is_empty() {
            return;
        }

        let visible = usize::from(area.height.saturating_sub(2));
        let skip = messages.len().saturating_sub(visible);
        let lines: Vec<Line> = messages
            .iter()
            .skip(skip)
            .map(|m| Line::from(Span::styled(m.clone(), Self::line_style(m, theme))))
            .collect();

        let block = Block::default()
            .title(format!(" Messages ({}) ", messages.len()))
            .title_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_when_empty() {
        let log = MessageLog::new();
        let panel = MessagesPanel::new(log.clone());
        assert_eq!(panel.height(), 0);

        log.add("HeroService: fetched heroes");
        assert_eq!(panel.height(), 3);

        for _ in 0..20 {
            log.add("HeroService: fetched heroes");
        }
        assert_eq!(panel.height(), 8);

        log.clear();
        assert_eq!(panel.height(), 0);
    }

    #[test]
    fn test_failures_are_highlighted() {
        let theme = Theme::default();
        let failed = MessagesPanel::line_style("HeroService: getHero id=99 failed: 404", &theme);
        assert_eq!(failed.fg, Some(theme.error()));

        let ok = MessagesPanel::line_style("HeroService: fetched heroes", &theme);
        assert_eq!(ok.fg, Some(theme.subtext()));
    }
}
