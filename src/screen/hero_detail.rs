use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::api::HeroService;
use crate::app::AppContext;
use crate::commands::Command;
use crate::config::{DetailAction, GlobalAction, KeyResolver};
use crate::hero::{Hero, HeroId};
use crate::screen::{Screen, ScreenMsg};
use crate::ui::{Component, EventResult, Keybinding, Spinner, TextInput, TextInputEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailMsg {
    Load,
    Loaded(Option<Hero>),
    StartEdit,
    Rename(String),
    CancelEdit,
    Save,
    Saved,
}

enum State {
    Loading,
    NotFound,
    Loaded(Hero),
    Saving(Hero),
}

/// One hero, editable.
pub struct HeroDetailScreen {
    id: HeroId,
    service: HeroService,
    resolver: Arc<KeyResolver>,
    state: State,
    spinner: Spinner,
    editor: Option<TextInput>,
    msg_tx: UnboundedSender<DetailMsg>,
    msg_rx: UnboundedReceiver<DetailMsg>,
}

impl HeroDetailScreen {
    pub fn new(id: HeroId, ctx: &AppContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            id,
            service: ctx.service.clone(),
            resolver: ctx.resolver.clone(),
            state: State::Loading,
            spinner: Spinner::new().with_label(format!("Loading hero {id}...")),
            editor: None,
            msg_tx,
            msg_rx,
        }
    }

    /// Queue a message to be processed by update().
    fn queue(&self, msg: DetailMsg) {
        let _ = self.msg_tx.send(msg);
    }

    const fn hero(&self) -> Option<&Hero> {
        match &self.state {
            State::Loaded(hero) | State::Saving(hero) => Some(hero),
            State::Loading | State::NotFound => None,
        }
    }

    fn process_message(&mut self, msg: DetailMsg) -> ScreenMsg {
        match msg {
            DetailMsg::Load => {
                self.state = State::Loading;
                FetchHeroCmd {
                    service: self.service.clone(),
                    id: self.id,
                    tx: self.msg_tx.clone(),
                }
                .into()
            }

            DetailMsg::Loaded(hero) => {
                self.state = hero.map_or(State::NotFound, State::Loaded);
                ScreenMsg::Idle
            }

            DetailMsg::StartEdit => {
                if let State::Loaded(hero) = &self.state {
                    self.editor = Some(TextInput::new("Name").with_value(hero.name.clone()));
                }
                ScreenMsg::Idle
            }

            DetailMsg::Rename(name) => {
                self.editor = None;
                if let State::Loaded(hero) = &mut self.state {
                    hero.name = name;
                }
                ScreenMsg::Idle
            }

            DetailMsg::CancelEdit => {
                self.editor = None;
                ScreenMsg::Idle
            }

            DetailMsg::Save => {
                let State::Loaded(hero) = &self.state else {
                    return ScreenMsg::Idle;
                };
                let hero = hero.clone();
                self.spinner = Spinner::new().with_label(format!("Saving {}...", hero.name));
                self.state = State::Saving(hero.clone());
                SaveHeroCmd {
                    service: self.service.clone(),
                    hero,
                    tx: self.msg_tx.clone(),
                }
                .into()
            }

            // Leave whether or not the save went through.
            DetailMsg::Saved => ScreenMsg::Back,
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        let Some(editor) = &mut self.editor else {
            return Ok(EventResult::Ignored);
        };
        match editor.handle_key(key)? {
            EventResult::Event(TextInputEvent::Submitted(name)) => self.queue(DetailMsg::Rename(name)),
            EventResult::Event(TextInputEvent::Cancelled) => self.queue(DetailMsg::CancelEdit),
            _ => {}
        }
        Ok(EventResult::Consumed)
    }

    fn render_hero(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let Some(hero) = self.hero().cloned() else {
            return;
        };

        let block = Block::default()
            .title(format!(" {} Details ", hero.name.to_uppercase()))
            .title_style(Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.highlight()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(inner);

        let label = Style::default().fg(theme.muted());
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("  id: ", label),
                Span::styled(hero.id.to_string(), Style::default().fg(theme.key())),
            ])),
            rows[0],
        );

        if let Some(editor) = &mut self.editor {
            editor.render(frame, rows[2], theme);
        } else {
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    Span::styled("name: ", label),
                    Span::styled(hero.name, Style::default().fg(theme.text())),
                ])),
                rows[1],
            );
        }

        if matches!(self.state, State::Saving(_)) {
            self.spinner.render(frame, rows[3], theme);
        }
    }

    fn render_not_found(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let lines = vec![
            Line::from(Span::styled(
                format!("No hero with id={}", self.id),
                Style::default()
                    .fg(theme.warning())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Press {} to go back", self.resolver.display_global(GlobalAction::Back)),
                Style::default().fg(theme.muted()),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border()));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

impl Screen for HeroDetailScreen {
    fn init(&mut self) {
        self.queue(DetailMsg::Load);
    }

    fn handle_tick(&mut self) {
        if matches!(self.state, State::Loading | State::Saving(_)) {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>> {
        if self.editor.is_some() {
            return self.handle_editor_key(key);
        }
        if !matches!(self.state, State::Loaded(_)) {
            return Ok(EventResult::Ignored);
        }

        if self.resolver.matches_detail(&key, DetailAction::Edit) {
            self.queue(DetailMsg::StartEdit);
            return Ok(EventResult::Consumed);
        }
        if self.resolver.matches_detail(&key, DetailAction::Save) {
            self.queue(DetailMsg::Save);
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
        match self.state {
            State::Loading => self.spinner.render(frame, area, theme),
            State::NotFound => self.render_not_found(frame, area, theme),
            State::Loaded(_) | State::Saving(_) => self.render_hero(frame, area, theme),
        }
    }

    fn breadcrumbs(&self) -> Vec<String> {
        let name = self
            .hero()
            .map_or_else(|| format!("Hero {}", self.id), |hero| hero.name.clone());
        vec!["Heroes".to_string(), name]
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![
            Keybinding::hint(self.resolver.display_detail(DetailAction::Edit), "Edit name"),
            Keybinding::hint(self.resolver.display_detail(DetailAction::Save), "Save"),
        ]
    }

    fn captures_input(&self) -> bool {
        self.editor.is_some()
    }
}

// === Commands ===

struct FetchHeroCmd {
    service: HeroService,
    id: HeroId,
    tx: UnboundedSender<DetailMsg>,
}

#[async_trait]
impl Command for FetchHeroCmd {
    fn name(&self) -> String {
        format!("Loading hero {}", self.id)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let hero = self.service.get_hero(self.id).await;
        self.tx.send(DetailMsg::Loaded(hero))?;
        Ok(())
    }
}

struct SaveHeroCmd {
    service: HeroService,
    hero: Hero,
    tx: UnboundedSender<DetailMsg>,
}

#[async_trait]
impl Command for SaveHeroCmd {
    fn name(&self) -> String {
        format!("Saving '{}'", self.hero.name)
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        self.service.update_hero(&self.hero).await;
        self.tx.send(DetailMsg::Saved)?;
        Ok(())
    }
}
