use std::sync::Arc;

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::Theme;
use crate::app::AppContext;
use crate::config::{KeyResolver, SearchAction};
use crate::hero::{Hero, HeroId};
use crate::search::{SearchOutcome, SearchPipeline};
use crate::ui::{
    Component, EventResult, List, ListEvent, Result, TextInput, TextInputEvent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroSearchEvent {
    /// A result was chosen.
    Selected(HeroId),
    /// Focus should move back to the surrounding screen.
    Leave,
}

/// Typeahead hero search: a text input feeding a [`SearchPipeline`] and the
/// list of matches below it.
pub struct HeroSearch {
    input: TextInput,
    results: List<Hero>,
    focus: Option<Focus>,
    pipeline: SearchPipeline,
    outcome_rx: UnboundedReceiver<SearchOutcome>,
    resolver: Arc<KeyResolver>,
}

impl HeroSearch {
    pub fn new(ctx: &AppContext) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let service = ctx.service.clone();
        let pipeline = SearchPipeline::spawn(
            ctx.debounce,
            move |term: String| {
                let service = service.clone();
                async move { service.search_heroes(&term).await }
            },
            outcome_tx,
        );

        let mut input = TextInput::new("Hero Search").with_placeholder("type a name");
        input.set_focused(false);
        let mut results = List::new("Results", Vec::new(), ctx.resolver.clone())
            .with_empty_text("No matches");
        results.set_focused(false);

        Self {
            input,
            results,
            focus: None,
            pipeline,
            outcome_rx,
            resolver: ctx.resolver.clone(),
        }
    }

    /// Give the keyboard to the search box.
    pub fn focus(&mut self) {
        self.set_focus(Some(Focus::Input));
    }

    pub fn blur(&mut self) {
        self.set_focus(None);
    }

    pub const fn is_focused(&self) -> bool {
        self.focus.is_some()
    }

    /// True while keystrokes are typed into the search box.
    pub fn is_typing(&self) -> bool {
        self.focus == Some(Focus::Input)
    }

    fn set_focus(&mut self, focus: Option<Focus>) {
        self.focus = focus;
        self.input.set_focused(focus == Some(Focus::Input));
        self.results.set_focused(focus == Some(Focus::Results));
    }

    /// Move from the input to the results, or out when there are none.
    fn leave_input(&mut self) -> EventResult<HeroSearchEvent> {
        if self.results.items().is_empty() {
            self.blur();
            HeroSearchEvent::Leave.into()
        } else {
            self.set_focus(Some(Focus::Results));
            EventResult::Consumed
        }
    }

    /// Apply finished searches. Call once per update cycle.
    pub fn poll(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            let title = if outcome.term.trim().is_empty() {
                "Results".to_string()
            } else {
                format!("Results for \"{}\" ({})", outcome.term, outcome.heroes.len())
            };
            self.results.set_title(title);
            self.results.set_items(outcome.heroes);
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Result<EventResult<HeroSearchEvent>> {
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            return Ok(self.leave_input());
        }
        Ok(match self.input.handle_key(key)? {
            EventResult::Event(TextInputEvent::Changed(term)) => {
                self.pipeline.search(term);
                EventResult::Consumed
            }
            EventResult::Event(TextInputEvent::Submitted(_)) => self.leave_input(),
            EventResult::Event(TextInputEvent::Cancelled) => {
                self.blur();
                HeroSearchEvent::Leave.into()
            }
            other => {
                if other.is_consumed() {
                    EventResult::Consumed
                } else {
                    EventResult::Ignored
                }
            }
        })
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> Result<EventResult<HeroSearchEvent>> {
        if self.resolver.matches_search(&key, SearchAction::Focus) {
            self.set_focus(Some(Focus::Input));
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_search(&key, SearchAction::Exit) {
            self.blur();
            return Ok(HeroSearchEvent::Leave.into());
        }
        Ok(match self.results.handle_key(key)? {
            EventResult::Event(ListEvent::Activated(hero)) => HeroSearchEvent::Selected(hero.id).into(),
            EventResult::Ignored => EventResult::Ignored,
            _ => EventResult::Consumed,
        })
    }
}

impl Component for HeroSearch {
    type Output = HeroSearchEvent;

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<Self::Output>> {
        match self.focus {
            Some(Focus::Input) => self.handle_input_key(key),
            Some(Focus::Results) => self.handle_results_key(key),
            None => Ok(EventResult::Ignored),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);

        self.input.render(frame, chunks[0], theme);
        self.results.render(frame, chunks[1], theme);
    }
}
