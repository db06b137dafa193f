mod app;
mod events;
mod persist;
mod strings;
mod terminal;
mod theme;
mod ui;

use anyhow::Result;
use directories::BaseDirs;
use glow_core::Catalog;
use glow_providers::routine::RoutineConfig;
use glow_providers::source::load_catalog;
use terminal::TerminalGuard;
use tracing::{info, warn};

fn main() -> Result<()> {
    let _log_guard = init_logging();

    let provider = match RoutineConfig::from_env_and_file() {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(target: "tui", "provider config unavailable: {}", e);
            None
        }
    };

    // One-shot catalog load; failure leaves an empty catalog and an inline
    // error entry, the app stays usable.
    let catalog_source = provider
        .as_ref()
        .map(|c| c.catalog.clone())
        .unwrap_or_else(|| "products.json".to_string());
    let rt = tokio::runtime::Runtime::new()?;
    let (catalog, catalog_err) = match rt.block_on(load_catalog(&catalog_source)) {
        Ok(c) => {
            info!(target: "tui", "catalog loaded: {} products", c.len());
            (c, None)
        }
        Err(e) => {
            warn!(target: "tui", "catalog load failed: {}", e);
            (Catalog::default(), Some(e.to_string()))
        }
    };
    drop(rt);

    let store = persist::selection_path();
    let selection = match store.as_deref() {
        Some(path) => match persist::load_selection(path) {
            Ok(s) => s,
            Err(e) => {
                warn!(target: "tui", "selection load failed: {}", e);
                glow_core::SelectionSet::new()
            }
        },
        None => glow_core::SelectionSet::new(),
    };

    let mut app = app::App::new(provider, catalog, catalog_err, selection, store);
    let mut term = TerminalGuard::new()?;
    events::run(&mut term.terminal, &mut app)
}

/// Log to a file under the data dir; stdout belongs to the TUI.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let base = BaseDirs::new()?;
    let dir = base.data_dir().join("glow");
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::never(dir, "glow.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
