// In crates/app-config/src/types.rs

use engine::ControllerSettings;
use execution::SimulationSettings;
use serde::Deserialize;
use strategies::ThreeMaSettings;

use crate::{Error, Result};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    #[serde(default)]
    pub app: AppSettings,
    /// What to trade and where its price history lives.
    pub market: MarketSettings,
    /// Moving-average periods.
    #[serde(default)]
    pub strategy: ThreeMaSettings,
    #[serde(default)]
    pub controller: ControllerSettings,
    /// Paper venue used by `backtest` and `watch`.
    #[serde(default)]
    pub simulation: SimulationSettings,
}

impl Settings {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;

        if self.market.symbol.trim().is_empty() {
            return Err(Error::Validation {
                key: "market.symbol",
                reason: "must not be empty".into(),
            });
        }
        if self.market.quote_currency.trim().is_empty() {
            return Err(Error::Validation {
                key: "market.quote_currency",
                reason: "must not be empty".into(),
            });
        }
        if !(self.simulation.initial_cash.is_finite() && self.simulation.initial_cash >= 0.0) {
            return Err(Error::Validation {
                key: "simulation.initial_cash",
                reason: format!("{} is not a non-negative amount", self.simulation.initial_cash),
            });
        }
        if !(0.0..1.0).contains(&self.simulation.commission_rate) {
            return Err(Error::Validation {
                key: "simulation.commission_rate",
                reason: format!("{} is outside [0, 1)", self.simulation.commission_rate),
            });
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,
    /// The log level for the application.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Worker threads for `optimize`; 0 uses every core.
    #[serde(default)]
    pub optimizer_cores: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            optimizer_cores: 0,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct MarketSettings {
    /// The trading pair (e.g., "ETHUSDT").
    pub symbol: String,
    /// Currency the account is funded in and entries are sized from.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
    /// CSV price history used when `--data` is not given.
    pub data_path: String,
}

fn default_environment() -> String {
    "development".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_quote_currency() -> String {
    "USDT".into()
}
