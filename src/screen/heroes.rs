use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::Theme;
use crate::api::HeroService;
use crate::app::AppContext;
use crate::commands::Command;
use crate::config::{HeroesAction, KeyResolver, NavAction};
use crate::hero::{Hero, HeroId, NewHero, normalize_name};
use crate::screen::{Route, Screen, ScreenMsg};
use crate::ui::{
    Component, EventResult, Keybinding, List, ListEvent, Spinner, TextInput, TextInputEvent,
};

// === Messages ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeroesMsg {
    Load,
    Loaded(Vec<Hero>),
    StartAdd,
    Add(String),
    Added(Hero),
    DialogCancelled,
    Delete(Hero),
    Open(HeroId),
}

// === Screen ===

/// Every hero, with add and delete.
pub struct HeroesScreen {
    service: HeroService,
    resolver: Arc<KeyResolver>,
    list: List<Hero>,
    spinner: Spinner,
    loading: bool,
    add_dialog: Option<TextInput>,
    msg_tx: UnboundedSender<HeroesMsg>,
    msg_rx: UnboundedReceiver<HeroesMsg>,
}

impl HeroesScreen {
    pub fn new(ctx: &AppContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            service: ctx.service.clone(),
            resolver: ctx.resolver.clone(),
            list: List::new("My Heroes", Vec::new(), ctx.resolver.clone())
                .with_empty_text("No heroes. Press a to add one."),
            spinner: Spinner::new().with_label("Loading heroes...".to_string()),
            loading: false,
            add_dialog: None,
            msg_tx,
            msg_rx,
        }
    }

    /// Queue a message to be processed by update().
    fn queue(&self, msg: HeroesMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn process_message(&mut self, msg: HeroesMsg) -> ScreenMsg {
        match msg {
            HeroesMsg::Load => {
                self.loading = true;
                FetchHeroesCmd {
                    service: self.service.clone(),
                    tx: self.msg_tx.clone(),
                }
                .into()
            }

            HeroesMsg::Loaded(heroes) => {
                self.loading = false;
                self.list.set_items(heroes);
                ScreenMsg::Idle
            }

            HeroesMsg::StartAdd => {
                self.add_dialog = Some(
                    TextInput::new("Hero name")
                        .with_placeholder("e.g. Mr. Incredible")
                        .popup(),
                );
                ScreenMsg::Idle
            }

            HeroesMsg::Add(raw) => {
                self.add_dialog = None;
                let Some(name) = normalize_name(&raw) else {
                    debug!("Ignoring blank hero name");
                    return ScreenMsg::Idle;
                };
                AddHeroCmd {
                    service: self.service.clone(),
                    hero: NewHero::new(name),
                    tx: self.msg_tx.clone(),
                }
                .into()
            }

            HeroesMsg::Added(hero) => {
                self.list.push(hero);
                ScreenMsg::Idle
            }

            HeroesMsg::DialogCancelled => {
                self.add_dialog = None;
                ScreenMsg::Idle
            }

            HeroesMsg::Delete(hero) => {
                // Optimistic: the row disappears before the backend answers.
                self.list.remove_where(|h| h.id == hero.id);
                DeleteHeroCmd {
                    service: self.service.clone(),
                    hero,
                }
                .into()
            }

            HeroesMsg::Open(id) => ScreenMsg::Navigate(Route::Detail(id)),
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let Some(dialog) = &mut self.add_dialog else {
            return Ok(EventResult::Ignored);
        };
        match dialog.handle_key(key)? {
            EventResult::Event(TextInputEvent::Submitted(name)) => self.queue(HeroesMsg::Add(name)),
            EventResult::Event(TextInputEvent::Cancelled) => self.queue(HeroesMsg::DialogCancelled),
            _ => {}
        }
        Ok(EventResult::Consumed)
    }
}

impl Screen for HeroesScreen {
    fn init(&mut self) {
        self.queue(HeroesMsg::Load);
    }

    fn handle_tick(&mut self) {
        if self.loading {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.add_dialog.is_some() {
            return self.handle_dialog_key(key);
        }

        let result = self.list.handle_key(key)?;
        if let EventResult::Event(ListEvent::Activated(hero)) = result {
            self.queue(HeroesMsg::Open(hero.id));
            return Ok(EventResult::Consumed);
        }
        if result.is_consumed() {
            return Ok(EventResult::Consumed);
        }

        if self.resolver.matches_heroes(&key, HeroesAction::Add) {
            self.queue(HeroesMsg::StartAdd);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_heroes(&key, HeroesAction::Delete)
            && let Some(hero) = self.list.selected()
        {
            self.queue(HeroesMsg::Delete(hero.clone()));
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_heroes(&key, HeroesAction::Reload) {
            self.queue(HeroesMsg::Load);
            return Ok(EventResult::Consumed);
        }

        Ok(EventResult::Ignored)
    }

    fn update(&mut self) -> Result<ScreenMsg> {
        let mut result = ScreenMsg::Idle;
        while let Ok(msg) = self.msg_rx.try_recv() {
            result = result.then(self.process_message(msg));
        }
        Ok(result)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.loading && self.list.items().is_empty() {
            self.spinner.render(frame, area, theme);
        } else {
            self.list.render(frame, area, theme);
        }
        if let Some(dialog) = &mut self.add_dialog {
            dialog.render(frame, area, theme);
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        vec!["Heroes".to_string()]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_nav(NavAction::Select), "Details"),
            Keybinding::hint(self.resolver.display_heroes(HeroesAction::Add), "Add hero"),
            Keybinding::hint(self.resolver.display_heroes(HeroesAction::Delete), "Delete"),
            Keybinding::new(self.resolver.display_heroes(HeroesAction::Reload), "Reload"),
        ]
    }

    fn captures_input(&self) -> bool {
        self.add_dialog.is_some()
    }
}

// === Commands ===

struct FetchHeroesCmd {
    service: HeroService,
    tx: UnboundedSender<HeroesMsg>,
}

#[async_trait]
impl Command for FetchHeroesCmd {
    fn name(&self) -> String {
        "Loading heroes".to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let heroes = self.service.get_heroes().await;
        self.tx.send(HeroesMsg::Loaded(heroes))?;
        Ok(())
    }
}

struct AddHeroCmd {
    service: HeroService,
    hero: NewHero,
    tx: UnboundedSender<HeroesMsg>,
}

#[async_trait]
impl Command for AddHeroCmd {
    fn name(&self) -> String {
        format!("Adding '{}'", self.hero.name)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        if let Some(hero) = self.service.add_hero(self.hero).await {
            self.tx.send(HeroesMsg::Added(hero))?;
        }
        Ok(())
    }
}

struct DeleteHeroCmd {
    service: HeroService,
    hero: Hero,
}

#[async_trait]
impl Command for DeleteHeroCmd {
    fn name(&self) -> String {
        format!("Deleting '{}'", self.hero.name)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        self.service.delete_hero(self.hero.id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::app::tests::test_context;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn run(msg: ScreenMsg) {
        if let ScreenMsg::Run(commands) = msg {
            for command in commands {
                command.execute().await.unwrap();
            }
        }
    }

    async fn loaded_screen() -> (HeroesScreen, AppContext) {
        let ctx = test_context();
        let mut screen = HeroesScreen::new(&ctx);
        screen.init();
        run(screen.update().unwrap()).await;
        screen.update().unwrap();
        (screen, ctx)
    }

    #[tokio::test]
    async fn test_init_loads_heroes() {
        let (screen, _ctx) = loaded_screen().await;
        assert_eq!(screen.list.items().len(), 10);
        assert!(!screen.loading);
        assert_eq!(screen.list.selected(), Some(&Hero::new(11, "Dr Nice")));
    }

    #[tokio::test]
    async fn test_add_hero_appends_normalized_name() {
        let (mut screen, _ctx) = loaded_screen().await;

        screen.handle_key(key(KeyCode::Char('a'))).unwrap();
        screen.update().unwrap();
        assert!(screen.captures_input());

        for c in "  zephyr ".chars() {
            screen.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        screen.handle_key(key(KeyCode::Enter)).unwrap();
        run(screen.update().unwrap()).await;
        screen.update().unwrap();

        assert!(!screen.captures_input());
        assert_eq!(screen.list.items().last(), Some(&Hero::new(21, "Zephyr")));
    }

    #[tokio::test]
    async fn test_blank_name_is_ignored() {
        let (mut screen, ctx) = loaded_screen().await;
        screen.queue(HeroesMsg::Add("   ".to_string()));
        assert!(matches!(screen.update().unwrap(), ScreenMsg::Idle));
        assert_eq!(screen.list.items().len(), 10);
        assert!(!ctx.service.messages().messages().iter().any(|m| m.contains("added")));
    }

    #[tokio::test]
    async fn test_delete_is_optimistic() {
        let (mut screen, ctx) = loaded_screen().await;

        screen.handle_key(key(KeyCode::Char('d'))).unwrap();
        let msg = screen.update().unwrap();

        // Gone locally before the request ran.
        assert_eq!(screen.list.items().len(), 9);
        assert!(!screen.list.items().iter().any(|h| h.id == HeroId(11)));

        run(msg).await;
        assert_eq!(ctx.service.get_hero(HeroId(11)).await, None);
    }

    #[tokio::test]
    async fn test_select_opens_detail() {
        let (mut screen, _ctx) = loaded_screen().await;
        screen.handle_key(key(KeyCode::Down)).unwrap();
        screen.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            screen.update().unwrap(),
            ScreenMsg::Navigate(Route::Detail(HeroId(12)))
        ));
    }

    #[tokio::test]
    async fn test_cancel_add_dialog() {
        let (mut screen, _ctx) = loaded_screen().await;
        screen.handle_key(key(KeyCode::Char('n'))).unwrap();
        screen.update().unwrap();
        screen.handle_key(key(KeyCode::Esc)).unwrap();
        screen.update().unwrap();
        assert!(!screen.captures_input());
    }
}
