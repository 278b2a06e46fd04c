//! HoldLens CLI: headless access to the holdings service.
//!
//! Commands:
//! - `names` lists the company names in a holdings file
//! - `search` resolves a company name to candidate symbols
//! - `history` prints indicators and fundamentals for a symbol
//! - `scan` loads every name in a file the way the dashboard does
//! - `config` prints the effective configuration

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use holdlens_core::effects::execute;
use holdlens_core::model::FundamentalEntry;
use holdlens_core::palette::{fundamental_category, indicator_category};
use holdlens_core::{
    Action, ClientConfig, Dashboard, DashboardApi, HttpDashboardClient, IndicatorEntry,
    Resolution, ShellMode,
};

#[derive(Parser)]
#[command(name = "holdlens", about = "HoldLens CLI: holdings indicators from the terminal")]
struct Cli {
    /// Config file (defaults to <config_dir>/holdlens/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL, overrides the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the company names in a holdings file.
    Names {
        /// Path of the spreadsheet, as seen by the service.
        file_path: String,
    },
    /// Print candidate symbols for a company name.
    Search {
        company: String,
    },
    /// Print indicators and fundamentals for a symbol.
    History {
        symbol: String,
    },
    /// Resolve and load every company in a holdings file.
    Scan {
        /// Path of the spreadsheet, as seen by the service.
        file_path: String,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    config.validate()?;

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let client = HttpDashboardClient::new(&config).context("failed to build HTTP client")?;
    debug!(base_url = client.base_url(), "client ready");

    match cli.command {
        Commands::Names { file_path } => run_names(&client, &file_path),
        Commands::Search { company } => run_search(&client, &company),
        Commands::History { symbol } => run_history(&client, &symbol),
        Commands::Scan { file_path } => run_scan(&client, &config, file_path),
        Commands::Config => Ok(()),
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_names(api: &dyn DashboardApi, file_path: &str) -> Result<()> {
    let names = api.load_names(file_path)?;
    for name in &names {
        println!("{name}");
    }
    info!(count = names.len(), "names loaded");
    Ok(())
}

fn run_search(api: &dyn DashboardApi, company: &str) -> Result<()> {
    let matches = api.search_symbol(company)?;
    if matches.is_empty() {
        bail!("No ticker found for {company}");
    }
    for candidate in &matches {
        println!(
            "{:<16} {}",
            candidate.symbol().unwrap_or("-"),
            candidate.display_name().unwrap_or("")
        );
    }
    Ok(())
}

fn run_history(api: &dyn DashboardApi, symbol: &str) -> Result<()> {
    let history = api.fetch_history(symbol)?;

    println!("Technical Indicators");
    println!("{}", "-".repeat(60));
    for entry in &history.indicators {
        println!("{}", indicator_line(entry));
    }

    println!();
    println!("Fundamentals");
    println!("{}", "-".repeat(60));
    for entry in &history.fundamentals {
        println!("{}", fundamental_line(entry));
    }
    Ok(())
}

fn run_scan(api: &dyn DashboardApi, config: &ClientConfig, file_path: String) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_concurrent_requests)
        .build()
        .context("failed to build request pool")?;

    let mut dashboard = Dashboard::new(ShellMode {
        resolution: Resolution::Eager,
        filtering: false,
    });
    let requests = pool.install(|| drive(&mut dashboard, api, Action::LoadStocks { file_path }));
    info!(requests, "scan finished");

    for name in dashboard.names() {
        let Some(record) = dashboard.record(name) else {
            continue;
        };
        let symbol = record.symbol.as_deref().unwrap_or("-");
        let badges: Vec<String> = record
            .summary()
            .into_iter()
            .map(IndicatorEntry::badge)
            .collect();
        println!(
            "{:<40} {:<14} {:<18} {}",
            name,
            symbol,
            record.phase.label(),
            badges.join("  ")
        );
    }

    for failure in dashboard.take_failures() {
        debug!(message = %failure.message, context = %failure.context, "scan failure");
    }
    if let Some(error) = dashboard.error() {
        eprintln!("Last error: {error}");
    }
    Ok(())
}

/// Run effects in waves: every effect of a wave executes in parallel, the
/// completions are applied in order, and their follow-ups form the next wave.
/// Returns the number of requests made.
fn drive(dashboard: &mut Dashboard, api: &dyn DashboardApi, action: Action) -> usize {
    let mut wave = dashboard.dispatch(action);
    let mut requests = 0;
    while !wave.is_empty() {
        requests += wave.len();
        let completions: Vec<Action> = wave
            .into_par_iter()
            .map(|effect| execute(api, effect))
            .collect();
        wave = Vec::new();
        for completion in completions {
            wave.extend(dashboard.dispatch(completion));
        }
    }
    requests
}

fn indicator_line(entry: &IndicatorEntry) -> String {
    format!(
        "{:<24} {:<24} [{:<10}] {}",
        entry.key,
        entry.value.render(", "),
        indicator_category(entry).tag(),
        entry.value.label.as_deref().unwrap_or("")
    )
}

fn fundamental_line(entry: &FundamentalEntry) -> String {
    format!(
        "{:<24} {:<24} [{}]",
        entry.key,
        entry.value.render(),
        fundamental_category(&entry.value).tag()
    )
}
