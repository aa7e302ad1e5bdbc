// In app/src/optimizer.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use app_config::Settings;
use backtester::{Backtester, RunReport};
use core_types::{Kline, Symbol};
use itertools::iproduct;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Deserialize;
use strategies::ThreeMaSettings;

// --- Structs for deserializing optimizer.toml ---

#[derive(Deserialize, Debug)]
pub struct OptimizerConfig {
    pub job: JobSettings,
    pub three_ma_params: ThreeMaParams,
}

#[derive(Deserialize, Debug)]
pub struct JobSettings {
    pub name: String,
    /// Overrides `market.data_path` for this job.
    pub data_path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)] // Allows serde to try parsing as one variant, then the next
pub enum ParamValue {
    Fixed(u32),
    List(Vec<u32>),
    Range { start: u32, end: u32, step: Option<u32> },
}

impl ParamValue {
    /// Every value this parameter takes in the sweep, in ascending order for ranges.
    pub fn expand(&self) -> Vec<u32> {
        match self {
            ParamValue::Fixed(v) => vec![*v],
            ParamValue::List(values) => values.clone(),
            ParamValue::Range { start, end, step } => {
                let step = step.unwrap_or(1).max(1) as usize;
                (*start..=*end).step_by(step).collect()
            }
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct ThreeMaParams {
    pub short_period: ParamValue,
    pub median_period: ParamValue,
    pub long_period: ParamValue,
}

// --- Public API for the Optimizer Module ---

pub fn load_optimizer_config(path: &Path) -> Result<OptimizerConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Builds every valid period combination. Combinations that are not
/// strictly increasing (or contain a zero) are skipped.
pub fn generate_parameter_sets(params: &ThreeMaParams) -> Vec<ThreeMaSettings> {
    let shorts = params.short_period.expand();
    let medians = params.median_period.expand();
    let longs = params.long_period.expand();

    let total = shorts.len() * medians.len() * longs.len();
    let sets: Vec<ThreeMaSettings> = iproduct!(shorts, medians, longs)
        .map(|(short_period, median_period, long_period)| ThreeMaSettings {
            short_period,
            median_period,
            long_period,
        })
        .filter(|settings| settings.validate().is_ok())
        .collect();

    tracing::info!(
        combinations = total,
        valid = sets.len(),
        skipped = total - sets.len(),
        "Generated parameter sets."
    );
    sets
}

/// Runs one backtest per parameter set on a dedicated thread pool.
///
/// Each run owns its controller and paper venue; only the price history is shared.
pub fn run_optimization(
    settings: &Settings,
    bars: &[Kline],
    param_sets: &[ThreeMaSettings],
) -> Result<Vec<RunReport>> {
    tracing::info!(cores = settings.app.optimizer_cores, "Configuring Rayon thread pool.");
    let pool = ThreadPoolBuilder::new()
        .num_threads(settings.app.optimizer_cores)
        .build()
        .context("Failed to build Rayon thread pool")?;

    let symbol = Symbol(settings.market.symbol.clone());
    let reports = pool.install(|| {
        param_sets
            .par_iter()
            .filter_map(|periods| {
                match run_single_backtest(settings, &symbol, *periods, bars) {
                    Ok(report) => Some(report),
                    Err(e) => {
                        tracing::error!(error = %e, ?periods, "A single backtest run failed.");
                        None
                    }
                }
            })
            .collect()
    });
    Ok(reports)
}

fn run_single_backtest(
    settings: &Settings,
    symbol: &Symbol,
    periods: ThreeMaSettings,
    bars: &[Kline],
) -> Result<RunReport> {
    let mut backtester = Backtester::new(
        symbol.clone(),
        &settings.market.quote_currency,
        periods,
        settings.controller,
        &settings.simulation,
    )?;
    backtester.run(bars.iter().cloned().map(Ok))
}
