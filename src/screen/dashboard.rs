use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::api::HeroService;
use crate::app::AppContext;
use crate::commands::Command;
use crate::config::{KeyResolver, NavAction, SearchAction};
use crate::hero::{Hero, HeroId};
use crate::screen::{Route, Screen, ScreenMsg};
use crate::ui::{Component, EventResult, Keybinding, List, ListEvent};
use crate::view::{HeroSearch, HeroSearchEvent};

/// How many heroes the dashboard features.
const TOP_HEROES: usize = 4;

/// The featured heroes: the list minus its first entry, capped at
/// [`TOP_HEROES`].
pub fn top_heroes(heroes: Vec<Hero>) -> Vec<Hero> {
    heroes.into_iter().skip(1).take(TOP_HEROES).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardMsg {
    Load,
    Loaded(Vec<Hero>),
    Open(HeroId),
}

/// Landing screen: top heroes plus the hero search.
pub struct DashboardScreen {
    service: HeroService,
    resolver: Arc<KeyResolver>,
    top: List<Hero>,
    search: HeroSearch,
    msg_tx: UnboundedSender<DashboardMsg>,
    msg_rx: UnboundedReceiver<DashboardMsg>,
}

impl DashboardScreen {
    pub fn new(ctx: &AppContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            service: ctx.service.clone(),
            resolver: ctx.resolver.clone(),
            top: List::new("Top Heroes", Vec::new(), ctx.resolver.clone())
                .with_empty_text("Loading..."),
            search: HeroSearch::new(ctx),
            msg_tx,
            msg_rx,
        }
    }

    /// Queue a message to be processed by update().
    fn queue(&self, msg: DashboardMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: DashboardMsg) -> ScreenMsg {
        match msg {
            DashboardMsg::Load => FetchTopHeroesCmd {
                service: self.service.clone(),
                tx: self.msg_tx.clone(),
            }
            .into(),

            DashboardMsg::Loaded(heroes) => {
                self.top.set_items(top_heroes(heroes));
                self.top.set_empty_text("No heroes yet");
                ScreenMsg::Idle
            }

            DashboardMsg::Open(id) => ScreenMsg::Navigate(Route::Detail(id)),
        }
    }

    fn focus_search(&mut self) {
        self.top.set_focused(false);
        self.search.focus();
    }

    fn focus_top(&mut self) {
        self.search.blur();
        self.top.set_focused(true);
    }
}

impl Screen for DashboardScreen {
    fn init(&mut self) {
        self.queue(DashboardMsg::Load);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.search.is_focused() {
            let result = self.search.handle_key(key)?;
            match result {
                EventResult::Event(HeroSearchEvent::Selected(id)) => {
                    self.queue(DashboardMsg::Open(id));
                    return Ok(EventResult::Consumed);
                }
                EventResult::Event(HeroSearchEvent::Leave) => {
                    self.focus_top();
                    return Ok(EventResult::Consumed);
                }
                EventResult::Consumed => return Ok(EventResult::Consumed),
                EventResult::Ignored => {}
            }
        }

        if self.resolver.matches_search(&key, SearchAction::Focus) {
            self.focus_search();
            return Ok(EventResult::Consumed);
        }

        if self.search.is_focused() {
            return Ok(EventResult::Ignored);
        }

        let result = self.top.handle_key(key)?;
        if let EventResult::Event(ListEvent::Activated(hero)) = result {
            self.queue(DashboardMsg::Open(hero.id));
            return Ok(EventResult::Consumed);
        }
        if result.is_consumed() {
            return Ok(EventResult::Consumed);
        }

        Ok(EventResult::Ignored)
    }

    fn update(&mut self) -> Result<ScreenMsg> {
        self.search.poll();
        let mut result = ScreenMsg::Idle;
        while let Ok(msg) = self.msg_rx.try_recv() {
            result = result.then(self.process_message(msg));
        }
        Ok(result)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let top_height = u16::try_from(TOP_HEROES + 2).unwrap_or(u16::MAX);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(top_height), Constraint::Min(6)])
            .split(area);

        self.top.render(frame, chunks[0], theme);
        self.search.render(frame, chunks[1], theme);
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Dashboard".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_nav(NavAction::Select), "Details"),
            Keybinding::hint(self.resolver.display_search(SearchAction::Focus), "Search"),
            Keybinding::new(self.resolver.display_search(SearchAction::Exit), "Leave search"),
        ]
    }

    fn captures_input(&self) -> bool {
        self.search.is_typing()
    }
}

// === Commands ===

struct FetchTopHeroesCmd {
    service: HeroService,
    tx: UnboundedSender<DashboardMsg>,
}

#[async_trait]
impl Command for FetchTopHeroesCmd {
    fn name(&self) -> String {
        "Loading top heroes".to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let heroes = self.service.get_heroes().await;
        self.tx.send(DashboardMsg::Loaded(heroes))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyCode, KeyModifiers};
    use tokio::time::sleep;

    use super::*;
    use crate::app::tests::test_context;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn loaded_screen() -> DashboardScreen {
        let ctx = test_context();
        let mut screen = DashboardScreen::new(&ctx);
        screen.init();
        if let ScreenMsg::Run(commands) = screen.update().unwrap() {
            for command in commands {
                command.execute().await.unwrap();
            }
        }
        screen.update().unwrap();
        screen
    }

    #[test]
    fn test_top_heroes_skips_first_and_caps() {
        let heroes: Vec<Hero> = (11..=20).map(|id| Hero::new(id, format!("h{id}"))).collect();
        let ids: Vec<u32> = top_heroes(heroes).iter().map(|h| h.id.0).collect();
        assert_eq!(ids, vec![12, 13, 14, 15]);

        assert!(top_heroes(vec![Hero::new(1, "only")]).is_empty());
        assert!(top_heroes(Vec::new()).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shows_top_heroes() {
        let screen = loaded_screen().await;
        let names: Vec<_> = screen.top.items().iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Narco", "Bombasto", "Celeritas", "Magneta"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_top_hero_opens_detail() {
        let mut screen = loaded_screen().await;
        screen.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            screen.update().unwrap(),
            ScreenMsg::Navigate(Route::Detail(HeroId(12)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_captures_typing() {
        let mut screen = loaded_screen().await;
        screen.handle_key(key(KeyCode::Char('/'))).unwrap();
        assert!(screen.captures_input());

        // 'q' is typed, not quit.
        let result = screen.handle_key(key(KeyCode::Char('q'))).unwrap();
        assert_eq!(result, EventResult::Consumed);

        screen.handle_key(key(KeyCode::Backspace)).unwrap();
        for c in "torn".chars() {
            screen.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        sleep(Duration::from_millis(400)).await;
        screen.update().unwrap();

        screen.handle_key(key(KeyCode::Tab)).unwrap();
        assert!(!screen.captures_input());
        screen.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            screen.update().unwrap(),
            ScreenMsg::Navigate(Route::Detail(HeroId(20)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_search_returns_to_top_heroes() {
        let mut screen = loaded_screen().await;
        screen.handle_key(key(KeyCode::Char('/'))).unwrap();
        screen.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!screen.captures_input());

        screen.handle_key(key(KeyCode::Down)).unwrap();
        assert_eq!(screen.top.selected().map(|h| h.id), Some(HeroId(13)));
    }
}
