// In crates/execution/src/types.rs

use std::collections::HashMap;

use core_types::{Position, Symbol};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Starting balance of the quote currency (e.g., 100000 USDT).
    #[serde(default = "default_initial_cash")]
    pub initial_cash: f64,

    /// Commission charged on every fill as a fraction of its value (e.g., 0.001 for 0.1%).
    #[serde(default)]
    pub commission_rate: f64,

    /// The simulated slippage percentage for market orders (e.g., 0.0005 for 0.05%).
    #[serde(default)]
    pub slippage_percent: f64,

    /// Balances of other currencies held in the wallet, keyed by currency code.
    #[serde(default)]
    pub extra_balances: HashMap<String, f64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            initial_cash: default_initial_cash(),
            commission_rate: 0.0,
            slippage_percent: 0.0,
            extra_balances: HashMap::new(),
        }
    }
}

fn default_initial_cash() -> f64 {
    100_000.0
}

/// Represents the state of the simulated trading account.
#[derive(Debug, Clone)]
pub struct Portfolio {
    /// The currency that cash, fees and P&L are settled in.
    pub quote_currency: String,

    /// Balance per currency. Only currencies that were ever funded have an entry.
    pub wallet: HashMap<String, Decimal>,

    /// A map holding the currently open positions, keyed by symbol.
    pub open_positions: HashMap<Symbol, Position>,
}

impl Portfolio {
    /// Creates a new portfolio with an initial cash balance.
    pub fn new(quote_currency: impl Into<String>, initial_cash: Decimal) -> Self {
        let quote_currency = quote_currency.into();
        let mut wallet = HashMap::new();
        wallet.insert(quote_currency.clone(), initial_cash);
        Self {
            quote_currency,
            wallet,
            open_positions: HashMap::new(),
        }
    }

    /// Cash held in the quote currency.
    pub fn cash(&self) -> Decimal {
        self.wallet
            .get(&self.quote_currency)
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn adjust_cash(&mut self, delta: Decimal) {
        *self
            .wallet
            .entry(self.quote_currency.clone())
            .or_default() += delta;
    }

    /// Cash plus the marked value of every open position.
    ///
    /// Positions without a mark are valued at their entry price.
    pub fn total_value(&self, marks: &HashMap<Symbol, Decimal>) -> Decimal {
        self.open_positions
            .values()
            .fold(self.cash(), |acc, pos| {
                let mark = marks.get(&pos.symbol).copied().unwrap_or(pos.entry_price);
                acc + pos.signed_quantity() * mark
            })
    }
}
