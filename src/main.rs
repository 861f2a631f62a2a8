use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{HeroService, HttpClient};
use crate::app::{App, AppContext};
use crate::backend::{BackendConfig, InMemoryDb};
use crate::config::KeyResolver;
use crate::messages::MessageLog;

mod api;
mod app;
mod backend;
mod cli;
mod commands;
mod config;
mod hero;
mod messages;
mod screen;
mod search;
mod theme;
mod tui;
mod ui;
mod view;

pub use theme::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = initialize_logging()?;
    info!("Starting hero-tour");

    let args = cli::Args::parse();

    let mut config = config::load()?;
    args.apply(&mut config);

    if args.init_config {
        let path = config::save(&config)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let resolver = Arc::new(KeyResolver::new(Arc::new(config.keybindings.clone())));
    let theme = theme::theme_from_name(&config.theme.name);

    let db = Arc::new(InMemoryDb::seeded());
    let router = backend::build_router(db, BackendConfig::with_latency(config.backend.latency()));
    let service = HeroService::new(HttpClient::new(router), MessageLog::new());

    let ctx = AppContext {
        service,
        resolver,
        debounce: config.search.debounce(),
    };

    let mut app = App::new(ctx, theme, args.initial_routes());
    app.run().await?;

    Ok(())
}

fn initialize_logging() -> Result<WorkerGuard> {
    let directory = dirs::data_local_dir().map_or_else(
        || std::path::PathBuf::from("logs"),
        |path| path.join("hero-tour").join("logs"),
    );
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::daily(&directory, "hero-tour.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .init();

    Ok(guard)
}
