//! Async commands pattern for side effects.
//!
//! Commands represent async operations that run outside the main event loop.
//! Screens return commands, and the App spawns them and tracks which ones are
//! still running for the status bar.

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::HeroService;
use crate::app::AppMessage;

/// Async commands that perform side effects.
///
/// Commands are spawned by the App and tracked for status display.
/// They typically send results back to a screen via a channel.
#[async_trait]
pub trait Command: Send + 'static {
    /// Human-readable name for status display.
    fn name(&self) -> String;

    /// Execute the command.
    async fn execute(self: Box<Self>) -> Result<()>;
}

/// Re-seeds the backend, then asks the App to reload the current screen.
pub struct ResetDataCmd {
    service: HeroService,
    tx: UnboundedSender<AppMessage>,
}

impl ResetDataCmd {
    pub const fn new(service: HeroService, tx: UnboundedSender<AppMessage>) -> Self {
        Self { service, tx }
    }
}

#[async_trait]
impl Command for ResetDataCmd {
    fn name(&self) -> String {
        "Resetting data".to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        if self.service.reset().await {
            self.tx.send(AppMessage::DataReset)?;
        }
        Ok(())
    }
}
