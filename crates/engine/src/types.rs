// In crates/engine/src/types.rs

use core_types::{OrderIntent, OrderRef};
use serde::Deserialize;
use strategies::SignalFrame;

/// Which signal flattens an open position.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExitRule {
    /// Close a long once the short regime holds, and a short once the long regime holds.
    #[default]
    OpposingRegime,
    /// Close a long when the short average crosses below the median, and the reverse for shorts.
    Crossover,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct ControllerSettings {
    /// Journal every bar and order event at INFO instead of DEBUG.
    #[serde(default)]
    pub verbose: bool,

    /// Enter short on the first bar of the short regime. Off by default.
    #[serde(default)]
    pub allow_short: bool,

    #[serde(default)]
    pub exit_rule: ExitRule,
}

/// Why a bar produced no order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Fewer bars than the longest moving-average period.
    WarmingUp,
    /// An earlier order has not reached a terminal status yet.
    OrderInFlight,
    /// Cash could not be read from the gateway.
    WalletUnavailable,
    /// The gateway refused the order outright.
    SubmitFailed,
    /// The computed size rounded down to nothing.
    ZeroSize,
}

/// What the controller did with one bar.
#[derive(Debug, Clone, PartialEq)]
pub enum BarOutcome {
    Skipped(SkipReason),
    /// Signals were evaluated; no action was warranted.
    Hold(SignalFrame),
    /// A new position was requested.
    Entry { frame: SignalFrame, order: OrderRef, intent: OrderIntent },
    /// A flatten order was requested.
    Exit { frame: SignalFrame, order: OrderRef },
}

impl BarOutcome {
    pub fn submitted(&self) -> Option<OrderRef> {
        match self {
            BarOutcome::Entry { order, .. } | BarOutcome::Exit { order, .. } => Some(*order),
            _ => None,
        }
    }
}
