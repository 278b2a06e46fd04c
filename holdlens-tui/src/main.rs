//! HoldLens TUI: terminal dashboard over a holdings spreadsheet.
//!
//! Panels:
//! 1. Holdings: company list, per-company indicators and fundamentals
//! 2. Lookup: resolve any company name and show its detail
//! 3. Help: keyboard shortcuts and colour legend

mod app;
mod input;
#[cfg(test)]
mod test_helpers;
mod theme;
mod ui;
mod worker;

use std::fs::{self, File};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use holdlens_core::{ClientConfig, Dashboard, DashboardApi, HttpDashboardClient, Resolution};

use crate::app::{AppState, Overlay};
use crate::worker::WorkerCommand;

#[derive(Parser)]
#[command(name = "holdlens-tui", about = "Terminal dashboard for a holdings spreadsheet")]
struct Args {
    /// Config file (defaults to <config_dir>/holdlens/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Service base URL, overrides the config file
    #[arg(long)]
    base_url: Option<String>,

    /// Holdings file to load on start
    #[arg(long)]
    file: Option<String>,

    /// Resolve symbols only when a company is opened
    #[arg(long)]
    lazy: bool,

    /// Disable the name filter
    #[arg(long)]
    no_filter: bool,

    /// Log file (defaults to <cache_dir>/holdlens/holdlens-tui.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(url) = args.base_url {
        config.base_url = url;
    }
    if args.lazy {
        config.shell.resolution = Resolution::Lazy;
    }
    if args.no_filter {
        config.shell.filtering = false;
    }
    config.validate()?;

    init_logging(args.log_file)?;
    info!(base_url = %config.base_url, shell = ?config.shell, "starting");

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let client = HttpDashboardClient::new(&config).context("failed to build HTTP client")?;
    let base_url = client.base_url().to_string();
    let api: Arc<dyn DashboardApi> = Arc::new(client);

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(api, config.max_concurrent_requests, cmd_rx, resp_tx)?;

    let mut app = AppState::new(Dashboard::new(config.shell), cmd_tx.clone(), resp_rx, base_url);
    match args.file {
        Some(path) => app.load_file(path),
        None => app.overlay = Overlay::Welcome,
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(explicit: Option<PathBuf>) -> Result<()> {
    let path = explicit.unwrap_or_else(|| {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("holdlens")
            .join("holdlens-tui.log")
    });
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log dir {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
