//! Full-window screens and the protocol the App drives them with.

mod dashboard;
mod hero_detail;
mod heroes;

use std::fmt;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::ListItem;

use crate::Theme;
use crate::commands::Command;
use crate::hero::{Hero, HeroId};
use crate::ui::{EventResult, Keybinding, ListRow};

pub use dashboard::DashboardScreen;
pub use hero_detail::HeroDetailScreen;
pub use heroes::HeroesScreen;

/// Where the App is. Each route owns one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Heroes,
    Detail(HeroId),
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::Heroes => write!(f, "heroes"),
            Self::Detail(id) => write!(f, "detail/{id}"),
        }
    }
}

pub enum ScreenMsg {
    /// No action needed
    Idle,
    /// Run one or more commands
    Run(Vec<Box<dyn Command>>),
    /// Leave this screen for another route
    Navigate(Route),
    /// Return to the previous route
    Back,
}

impl ScreenMsg {
    /// Combine the results of two processed messages.
    ///
    /// Commands accumulate. Navigation wins over commands, since the screen
    /// that queued them is about to be replaced.
    pub fn then(self, next: Self) -> Self {
        match (self, next) {
            (Self::Idle, next) => next,
            (current, Self::Idle) => current,
            (Self::Run(mut commands), Self::Run(more)) => {
                commands.extend(more);
                Self::Run(commands)
            }
            (current @ (Self::Navigate(_) | Self::Back), Self::Run(_)) => current,
            (_, next) => next,
        }
    }
}

impl<T: Command> From<T> for ScreenMsg {
    fn from(value: T) -> Self {
        Self::Run(vec![Box::new(value)])
    }
}

impl fmt::Debug for ScreenMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Run(commands) => f
                .debug_tuple("Run")
                .field(&commands.iter().map(|c| c.name()).collect::<Vec<_>>())
                .finish(),
            Self::Navigate(route) => f.debug_tuple("Navigate").field(route).finish(),
            Self::Back => write!(f, "Back"),
        }
    }
}

/// A full-window screen.
///
/// Screens manage their own internal state and message queue. The App calls
/// methods in this order:
///
/// 1. `init()` - once when the screen becomes active
/// 2. `update()` - immediately after init to process startup messages
/// 3. For each event:
///    - `handle_tick()` if tick event
///    - `handle_key()` if key event
///    - `update()`
/// 4. When commands complete: `update()`
pub trait Screen {
    /// Initialize the screen by queuing startup message(s).
    fn init(&mut self) {}

    /// Handle a tick event for animations.
    fn handle_tick(&mut self) {}

    /// Handle a key event.
    ///
    /// # Errors
    /// Returns an error if a component fails to process the key.
    fn handle_key(&mut self, key: KeyEvent) -> Result<EventResult<()>>;

    /// Process all queued messages and return the result.
    ///
    /// # Errors
    /// Returns an error if message processing fails.
    fn update(&mut self) -> Result<ScreenMsg>;

    /// Render the screen to the frame.
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Breadcrumb segments for the status bar.
    fn breadcrumbs(&self) -> Vec<String>;

    /// Returns the keybindings for the current state of this screen.
    fn keybindings(&self) -> Vec<Keybinding> {
        vec![]
    }

    /// Whether a text input currently owns the keyboard, so global
    /// shortcuts must not fire.
    fn captures_input(&self) -> bool {
        false
    }
}

impl ListRow for Hero {
    fn render_row(&self, theme: &Theme) -> ListItem<'static> {
        ListItem::new(Line::from(vec![
            Span::styled(format!("{:>4} ", self.id.0), Style::default().fg(theme.key())),
            Span::styled(self.name.clone(), Style::default().fg(theme.text())),
        ]))
    }
}
