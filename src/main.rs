//! Cinewatch - browse OMDb movies from the terminal
//!
//! A terminal UI application for searching movies by title, filtering and
//! sorting the results, and keeping a list of favorites.

use std::io;
use std::panic;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use cinewatch::app::App;
use cinewatch::cache::{CacheStore, FileStore, MemoryStore, PersistentStore};
use cinewatch::cli::{Cli, StartupConfig};
use cinewatch::collections::CollectionBuilder;
use cinewatch::data::OmdbClient;
use cinewatch::library::Library;
use cinewatch::loader::{self, Loader};
use cinewatch::logging::init_tracing;
use cinewatch::ui;

/// Where cached responses, saved lists and the log file live
struct StoragePaths {
    cache: PathBuf,
    data: PathBuf,
    logs: PathBuf,
}

impl StoragePaths {
    /// `--cache-dir` wins; otherwise the platform directories for cinewatch
    fn resolve(config: &StartupConfig) -> Option<Self> {
        if let Some(dir) = &config.cache_dir {
            return Some(Self {
                cache: dir.join("cache"),
                data: dir.clone(),
                logs: dir.clone(),
            });
        }
        let project_dirs = ProjectDirs::from("", "", "cinewatch")?;
        Some(Self {
            cache: project_dirs.cache_dir().join("cache"),
            data: project_dirs.data_dir().to_path_buf(),
            logs: project_dirs.cache_dir().to_path_buf(),
        })
    }
}

/// File-backed stores when a directory is known, volatile ones otherwise
fn open_stores(paths: Option<&StoragePaths>) -> (Arc<dyn PersistentStore>, Arc<dyn PersistentStore>) {
    match paths {
        Some(paths) => {
            let cache: Arc<dyn PersistentStore> = Arc::new(FileStore::new(paths.cache.clone()));
            let lists: Arc<dyn PersistentStore> = Arc::new(FileStore::new(paths.data.clone()));
            (cache, lists)
        }
        None => {
            warn!("no home directory, cache and lists will not persist");
            let cache: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
            let lists: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new());
            (cache, lists)
        }
    }
}

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let paths = StoragePaths::resolve(&config);
    if let Some(paths) = &paths {
        // Runs without a subscriber if the log file cannot be opened
        if let Err(e) = init_tracing(config.log_level, &paths.logs) {
            eprintln!("Warning: logging disabled: {}", e);
        }
    }

    let (cache_store, list_store) = open_stores(paths.as_ref());

    let api = OmdbClient::new(config.api_key.clone()).with_base_url(config.base_url.clone());
    let cache = Arc::new(CacheStore::new(cache_store));
    let builder = Arc::new(CollectionBuilder::new(Arc::new(api), cache));
    info!(
        network = builder.uses_network(config.force_mock),
        "starting cinewatch"
    );

    let (loader, mut receiver) = Loader::new(builder);
    let mut app = App::new(Library::load(list_store), &config);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    loop {
        loader.dispatch_all(app.take_requests());

        while let Some(message) = loader::try_recv(&mut receiver) {
            app.apply(message);
        }

        // Render UI
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    info!("exiting");
    Ok(())
}
