//! Terminal ownership and the input event task.
//!
//! [`Tui`] puts the terminal into raw mode on the alternate screen and runs a
//! background task that turns crossterm input, tick and render timers and
//! SIGTERM into a single stream of [`Event`]s.

use std::io::Stdout;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::cursor;
use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use futures::{FutureExt, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// How long the event task gets to notice cancellation before it is aborted.
const ABORT_AFTER: Duration = Duration::from_millis(500);
/// Give up waiting for the event task altogether.
const GIVE_UP_AFTER: Duration = Duration::from_secs(2);

pub type Backend = CrosstermBackend<Stdout>;

#[derive(Clone, Debug)]
pub enum Event {
    Init,
    Quit,
    Suspend,
    Error(String),
    Tick,
    Render,
    Key(KeyEvent),
    Resize(u16, u16),
}

/// Map a raw terminal event to an app event. `None` drops it.
///
/// Ctrl+C and Ctrl+Z are handled here so they work whatever has focus.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            Some(match key.code {
                KeyCode::Char('c') if ctrl => Event::Quit,
                KeyCode::Char('z') if ctrl => Event::Suspend,
                _ => Event::Key(key),
            })
        }
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

pub struct Tui {
    terminal: Terminal<Backend>,
    events: UnboundedReceiver<Event>,
    sender: UnboundedSender<Event>,
    reader: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
    tick_period: Duration,
    frame_period: Duration,
}

impl Tui {
    /// `tick_period` paces animations, `frame_period` paces redraws.
    pub fn new(tick_period: Duration, frame_period: Duration) -> Result<Self> {
        let (sender, events) = mpsc::unbounded_channel();
        Ok(Self {
            terminal: Terminal::new(Backend::new(std::io::stdout()))?,
            events,
            sender,
            reader: None,
            shutdown: CancellationToken::new(),
            tick_period,
            frame_period,
        })
    }

    /// Take over the terminal and start producing events.
    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        crossterm::execute!(std::io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        self.spawn_reader();
        Ok(())
    }

    /// Stop the event task and hand the terminal back to the shell.
    pub fn exit(&mut self) -> Result<()> {
        self.stop_reader()?;
        if terminal::is_raw_mode_enabled()? {
            self.terminal.flush()?;
            crossterm::execute!(std::io::stdout(), LeaveAlternateScreen, cursor::Show)?;
            terminal::disable_raw_mode()?;
        }
        Ok(())
    }

    /// Restore the terminal and stop the process until it is foregrounded.
    pub fn suspend(&mut self) -> Result<()> {
        self.exit()?;
        #[cfg(not(windows))]
        signal_hook::low_level::raise(signal_hook::consts::SIGTSTP)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.enter()
    }

    pub async fn next_event(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    fn spawn_reader(&mut self) {
        self.shutdown.cancel();
        self.shutdown = CancellationToken::new();
        self.reader = Some(tokio::spawn(read_events(
            self.sender.clone(),
            self.shutdown.clone(),
            self.tick_period,
            self.frame_period,
        )));
    }

    fn stop_reader(&mut self) -> Result<()> {
        self.shutdown.cancel();
        let Some(reader) = self.reader.take() else {
            return Ok(());
        };

        let started = Instant::now();
        while !reader.is_finished() {
            let waited = started.elapsed();
            if waited >= GIVE_UP_AFTER {
                return Err(eyre!("Event task did not stop within {GIVE_UP_AFTER:?}"));
            }
            if waited >= ABORT_AFTER {
                reader.abort();
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        debug!("Event task stopped");
        Ok(())
    }
}

#[cfg(unix)]
fn forward_sigterm(sender: UnboundedSender<Event>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                let _ = sender.send(Event::Quit);
            }
            Err(e) => warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    });
}

async fn read_events(
    sender: UnboundedSender<Event>,
    shutdown: CancellationToken,
    tick_period: Duration,
    frame_period: Duration,
) {
    let mut input = EventStream::new();
    let mut ticks = interval(tick_period);
    let mut frames = interval(frame_period);

    #[cfg(unix)]
    forward_sigterm(sender.clone());

    if sender.send(Event::Init).is_err() {
        return;
    }

    loop {
        let event = tokio::select! {
            () = shutdown.cancelled() => break,
            _ = ticks.tick() => Event::Tick,
            _ = frames.tick() => Event::Render,
            next = input.next().fuse() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => Event::Error(e.to_string()),
                None => break,
            },
        };
        if sender.send(event).is_err() {
            break;
        }
    }
    shutdown.cancel();
}

impl Deref for Tui {
    type Target = Terminal<Backend>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Tui {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = self.exit() {
            error!(error = %e, "Failed to restore the terminal");
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseEvent, MouseEventKind};

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_ctrl_c_and_ctrl_z_are_global() {
        assert!(matches!(
            translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::Quit)
        ));
        assert!(matches!(
            translate(key(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            Some(Event::Suspend)
        ));
    }

    #[test]
    fn test_plain_keys_pass_through() {
        assert!(matches!(
            translate(key(KeyCode::Char('c'), KeyModifiers::NONE)),
            Some(Event::Key(k)) if k.code == KeyCode::Char('c')
        ));
    }

    #[test]
    fn test_key_release_is_dropped() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(translate(CrosstermEvent::Key(release)).is_none());
    }

    #[test]
    fn test_resize_and_mouse() {
        assert!(matches!(
            translate(CrosstermEvent::Resize(80, 24)),
            Some(Event::Resize(80, 24))
        ));

        let mouse = MouseEvent {
            kind: MouseEventKind::Moved,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert!(translate(CrosstermEvent::Mouse(mouse)).is_none());
    }
}
