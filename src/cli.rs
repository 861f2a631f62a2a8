use clap::{Parser, ValueEnum};

use crate::config::AppConfig;
use crate::hero::HeroId;
use crate::screen::Route;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartRoute {
    Dashboard,
    Heroes,
}

#[derive(Parser, Debug)]
#[command(name = "hero-tour", version, about = "Browse and edit a roster of heroes")]
pub struct Args {
    /// Screen to open on start
    #[arg(short, long, value_enum, default_value_t = StartRoute::Dashboard)]
    pub route: StartRoute,

    /// Open the detail view of this hero id directly
    #[arg(long)]
    pub hero: Option<u32>,

    /// Simulated backend latency in milliseconds (overrides the config file)
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Search debounce in milliseconds (overrides the config file)
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Apply command line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(latency_ms) = self.latency_ms {
            config.backend.latency_ms = latency_ms;
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.search.debounce_ms = debounce_ms;
        }
    }

    /// Routes to start with, oldest first. The last one is shown; the
    /// others are what "back" returns to.
    pub fn initial_routes(&self) -> Vec<Route> {
        let base = match self.route {
            StartRoute::Dashboard => Route::Dashboard,
            StartRoute::Heroes => Route::Heroes,
        };
        match self.hero {
            Some(id) => vec![base, Route::Detail(HeroId(id))],
            None => vec![base],
        }
    }
}
