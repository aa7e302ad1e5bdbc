// In app/src/main.rs

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use app_config::Settings;
use backtester::{Backtester, print_report};
use clap::{Parser, Subcommand};
use core_types::Symbol;
use engine::BalanceWatcher;
use execution::PaperGateway;
use market_data::CsvFeed;
use tracing_subscriber::prelude::*;

mod analyzer;
mod optimizer;

use crate::analyzer::{print_leaderboard, rank_reports};
use crate::optimizer::{generate_parameter_sets, load_optimizer_config, run_optimization};

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "A three-moving-average signal and position controller."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replays a CSV price history through the controller and a paper venue.
    Backtest {
        /// CSV price history. Defaults to `market.data_path`.
        #[arg(short, long)]
        data: Option<PathBuf>,
    },

    /// Runs a full parameter sweep over the moving-average periods.
    Optimize {
        /// The sweep definition.
        #[arg(long, default_value = "config/optimizer.toml")]
        config: PathBuf,

        /// Also write the ranked results as JSON.
        #[arg(long)]
        output: Option<PathBuf>,

        /// How many runs to print.
        #[arg(long, default_value_t = 20)]
        top: usize,
    },

    /// Prints every bar with a moving average and the paper wallet's balances. Never trades.
    Watch {
        /// CSV price history. Defaults to `market.data_path`.
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Currencies to report. Defaults to every funded currency.
        #[arg(short, long = "currency")]
        currencies: Vec<String>,

        /// Window of the moving average printed with each bar.
        #[arg(long, default_value_t = 21)]
        sma_period: u32,
    },
}

// --- Main Application Entry Point ---

fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings().context("Failed to load configuration")?;
    init_tracing(&settings.app.log_level);

    tracing::info!(environment = %settings.app.environment, "Starting Triad application");

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Backtest { data } => handle_backtest(&settings, data)?,
        Commands::Optimize { config, output, top } => {
            handle_optimize(&settings, &config, output.as_deref(), top)?
        }
        Commands::Watch { data, currencies, sma_period } => {
            handle_watch(&settings, data, currencies, sma_period)?
        }
    }

    tracing::info!("Triad application has finished successfully.");

    Ok(())
}

fn init_tracing(log_level: &str) {
    let level = log_level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new().with_default(level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn data_path(settings: &Settings, data: Option<PathBuf>) -> PathBuf {
    data.unwrap_or_else(|| PathBuf::from(&settings.market.data_path))
}

/// Handles the logic for the `backtest` subcommand.
fn handle_backtest(settings: &Settings, data: Option<PathBuf>) -> Result<()> {
    // --- 1. Open the Price History ---
    let path = data_path(settings, data);
    let feed = CsvFeed::open(&path)
        .with_context(|| format!("Failed to open price history {}", path.display()))?;

    // --- 2. Instantiate All Components ---
    let mut backtester = Backtester::new(
        Symbol(settings.market.symbol.clone()),
        &settings.market.quote_currency,
        settings.strategy,
        settings.controller,
        &settings.simulation,
    )?;

    // --- 3. Run and Report ---
    let report = backtester.run(feed)?;
    print_report(&report);
    Ok(())
}

/// Handles the logic for the `optimize` subcommand.
fn handle_optimize(
    settings: &Settings,
    config_path: &Path,
    output: Option<&Path>,
    top: usize,
) -> Result<()> {
    let start_time = Instant::now();
    tracing::info!("Starting optimization job...");

    // --- 1. Load the Job ---
    let optimizer_config = load_optimizer_config(config_path)?;
    let path = optimizer_config
        .job
        .data_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.market.data_path));
    let bars = market_data::load_csv(&path)
        .with_context(|| format!("Failed to load price history {}", path.display()))?;

    let param_sets = generate_parameter_sets(&optimizer_config.three_ma_params);
    if param_sets.is_empty() {
        anyhow::bail!("No valid period combination in {}", config_path.display());
    }

    // --- 2. Run in Parallel ---
    let reports = run_optimization(settings, &bars, &param_sets)?;
    let ranked = rank_reports(reports);

    tracing::info!(
        job = %optimizer_config.job.name,
        runs = ranked.len(),
        elapsed = ?start_time.elapsed(),
        "Optimization job finished."
    );

    // --- 3. Report ---
    print_leaderboard(&optimizer_config.job.name, &ranked, top);
    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&ranked)?;
        std::fs::write(output, json)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        tracing::info!(path = %output.display(), "Saved ranked results.");
    }
    Ok(())
}

/// Handles the logic for the `watch` subcommand.
fn handle_watch(
    settings: &Settings,
    data: Option<PathBuf>,
    currencies: Vec<String>,
    sma_period: u32,
) -> Result<()> {
    let path = data_path(settings, data);
    let symbol = Symbol(settings.market.symbol.clone());
    let mut gateway = PaperGateway::new(&settings.simulation, &settings.market.quote_currency)?;

    let currencies = if currencies.is_empty() {
        let mut funded: Vec<String> = settings.simulation.extra_balances.keys().cloned().collect();
        funded.sort();
        funded.insert(0, settings.market.quote_currency.clone());
        funded
    } else {
        currencies
    };
    let mut watcher = BalanceWatcher::new(currencies, sma_period)?;

    let feed = CsvFeed::open(&path)
        .with_context(|| format!("Failed to open price history {}", path.display()))?;
    let mut bars = 0usize;
    for bar in market_data::ordered(feed) {
        let bar = bar.with_context(|| format!("Failed to read bar #{}", bars + 1))?;
        gateway.process_bar(&symbol, &bar);
        watcher.on_bar(&bar, &gateway);
        bars += 1;
    }
    tracing::info!(bars, "Watch finished.");
    Ok(())
}
