use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::api::HeroService;
use crate::commands::{Command, ResetDataCmd};
use crate::config::{GlobalAction, KeyResolver};
use crate::screen::{DashboardScreen, HeroDetailScreen, HeroesScreen, Route, Screen, ScreenMsg};
use crate::tui::{Event, Tui};
use crate::ui::{Component, EventResult, HelpEvent, HelpOverlay, KeybindingSection, StatusBar};
use crate::view::MessagesPanel;

/// Redraw at roughly 60 fps.
const FRAME_PERIOD: Duration = Duration::from_micros(16_667);
/// Animation tick, 8 per second.
const TICK_PERIOD: Duration = Duration::from_millis(125);
const STATUS_BAR_HEIGHT: u16 = 8;

/// Shared handles every screen is built from.
#[derive(Clone)]
pub struct AppContext {
    pub service: HeroService,
    pub resolver: Arc<KeyResolver>,
    pub debounce: Duration,
}

/// Messages sent to the App by spawned commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessage {
    CommandFinished { id: u64, error: Option<String> },
    /// The backend was re-seeded underneath the current screen.
    DataReset,
}

struct RunningCommand {
    id: u64,
    name: String,
}

pub struct App {
    ctx: AppContext,
    theme: Theme,
    route: Route,
    history: Vec<Route>,
    screen: Box<dyn Screen>,
    help: Option<HelpOverlay>,
    status_bar: StatusBar,
    messages: MessagesPanel,
    running: Vec<RunningCommand>,
    next_command_id: u64,
    msg_tx: UnboundedSender<AppMessage>,
    msg_rx: UnboundedReceiver<AppMessage>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    /// Create the App showing the last of `routes`; the earlier ones form
    /// the back history.
    pub fn new(ctx: AppContext, theme: Theme, mut routes: Vec<Route>) -> Self {
        let route = routes.pop().unwrap_or(Route::Dashboard);
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let mut screen = build_screen(route, &ctx);
        screen.init();

        Self {
            status_bar: StatusBar::new(ctx.resolver.clone()),
            messages: MessagesPanel::new(ctx.service.messages().clone()),
            ctx,
            theme,
            route,
            history: routes,
            screen,
            help: None,
            running: Vec::new(),
            next_command_id: 0,
            msg_tx,
            msg_rx,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new(TICK_PERIOD, FRAME_PERIOD)?;
        tui.enter()?;

        while let Some(event) = tui.next_event().await {
            self.handle_event(&mut tui, event)?;
            self.update();

            if self.should_suspend {
                tui.suspend()?;
                self.should_suspend = false;
                tui.resume()?;
                tui.clear()?;
            } else if self.should_quit {
                break;
            }
        }

        tui.exit()?;
        info!("Exiting");
        Ok(())
    }

    fn handle_event(&mut self, tui: &mut Tui, event: Event) -> Result<()> {
        match event {
            Event::Init => {}
            Event::Quit => self.should_quit = true,
            Event::Suspend => self.should_suspend = true,
            Event::Error(e) => warn!(error = %e, "Terminal event error"),
            Event::Tick => self.screen.handle_tick(),
            Event::Render => self.render(tui)?,
            Event::Resize(width, height) => {
                tui.resize(Rect::new(0, 0, width, height))?;
                self.render(tui)?;
            }
            Event::Key(key) => self.handle_key(key)?,
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if let Some(help) = &mut self.help {
            if let EventResult::Event(HelpEvent::Close) = help.handle_key(key)? {
                self.help = None;
            }
            return Ok(());
        }

        // A focused text input gets every key, shortcuts included.
        if self.screen.captures_input() {
            self.screen.handle_key(key)?;
            return Ok(());
        }
        if self.screen.handle_key(key)?.is_consumed() {
            return Ok(());
        }

        let resolver = self.ctx.resolver.clone();
        if resolver.matches_global(&key, GlobalAction::Quit) {
            self.should_quit = true;
        } else if resolver.matches_global(&key, GlobalAction::Help) {
            self.open_help();
        } else if resolver.matches_global(&key, GlobalAction::Back) {
            self.go_back();
        } else if resolver.matches_global(&key, GlobalAction::Dashboard) {
            self.navigate(Route::Dashboard);
        } else if resolver.matches_global(&key, GlobalAction::Heroes) {
            self.navigate(Route::Heroes);
        } else if resolver.matches_global(&key, GlobalAction::ClearMessages) {
            self.ctx.service.messages().clear();
        } else if resolver.matches_global(&key, GlobalAction::ResetData) {
            let command = ResetDataCmd::new(self.ctx.service.clone(), self.msg_tx.clone());
            self.spawn(Box::new(command));
        }
        Ok(())
    }

    fn open_help(&mut self) {
        let sections = vec![
            KeybindingSection::new(
                self.screen.breadcrumbs().join(" › "),
                self.screen.keybindings(),
            ),
            KeybindingSection::new("Global", self.status_bar.global_keybindings()),
        ];
        self.help = Some(HelpOverlay::new(sections, self.ctx.resolver.clone()));
    }

    /// Apply finished commands and let the screen process its queue.
    fn update(&mut self) {
        self.drain_messages();
        while self.update_screen() {}
    }

    fn drain_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            match msg {
                AppMessage::CommandFinished { id, error } => {
                    let Some(pos) = self.running.iter().position(|c| c.id == id) else {
                        continue;
                    };
                    let command = self.running.remove(pos);
                    match error {
                        Some(error) => warn!(command = %command.name, %error, "Command failed"),
                        None => debug!(command = %command.name, "Command finished"),
                    }
                }
                AppMessage::DataReset => {
                    info!(route = %self.route, "Data reset, reloading screen");
                    self.open_current();
                }
            }
        }
    }

    /// Returns true when the screen changed and the new one needs an update.
    fn update_screen(&mut self) -> bool {
        match self.screen.update() {
            Ok(ScreenMsg::Idle) => false,
            Ok(ScreenMsg::Run(commands)) => {
                for command in commands {
                    self.spawn(command);
                }
                false
            }
            Ok(ScreenMsg::Navigate(route)) => self.navigate(route),
            Ok(ScreenMsg::Back) => self.go_back(),
            Err(e) => {
                error!(route = %self.route, error = %e, "Screen update failed");
                self.ctx.service.messages().add(format!("App: {e}"));
                false
            }
        }
    }

    fn spawn(&mut self, command: Box<dyn Command>) {
        let id = self.next_command_id;
        self.next_command_id += 1;

        let name = command.name();
        debug!(command = %name, "Spawning command");
        self.running.push(RunningCommand { id, name });

        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let error = command.execute().await.err().map(|e| e.to_string());
            let _ = tx.send(AppMessage::CommandFinished { id, error });
        });
    }

    fn navigate(&mut self, route: Route) -> bool {
        if route == self.route {
            return false;
        }
        debug!(from = %self.route, to = %route, "Navigating");
        let previous = std::mem::replace(&mut self.route, route);
        self.history.push(previous);
        self.open_current();
        true
    }

    fn go_back(&mut self) -> bool {
        let Some(route) = self.history.pop() else {
            return false;
        };
        debug!(from = %self.route, to = %route, "Navigating back");
        self.route = route;
        self.open_current();
        true
    }

    /// Rebuild the screen for the current route.
    fn open_current(&mut self) {
        self.screen = build_screen(self.route, &self.ctx);
        self.screen.init();
    }

    fn render(&mut self, tui: &mut Tui) -> Result<()> {
        tui.draw(|frame| self.draw(frame))?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [main, messages, status] = Layout::vertical([
            Constraint::Min(5),
            Constraint::Length(self.messages.height()),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .areas(area);

        self.screen.render(frame, main, &self.theme);
        self.messages.render(frame, messages, &self.theme);

        let activity = self.running.first().map(|c| c.name.as_str());
        self.status_bar.render(
            frame,
            status,
            &self.theme,
            &self.screen.breadcrumbs(),
            &self.screen.keybindings(),
            activity,
        );

        if let Some(help) = &mut self.help {
            help.render(frame, area, &self.theme);
        }
    }
}

fn build_screen(route: Route, ctx: &AppContext) -> Box<dyn Screen> {
    match route {
        Route::Dashboard => Box::new(DashboardScreen::new(ctx)),
        Route::Heroes => Box::new(HeroesScreen::new(ctx)),
        Route::Detail(id) => Box::new(HeroDetailScreen::new(id, ctx)),
    }
}
