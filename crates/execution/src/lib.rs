// In crates/execution/src/lib.rs

use core_types::{OrderIntent, OrderRef, OrderUpdate, Position, Symbol};
use rust_decimal::Decimal;

pub mod error;
pub mod simulated;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use simulated::PaperGateway;
pub use types::{Portfolio, SimulationSettings};

/// The universal interface for an execution venue.
///
/// A gateway owns cash and positions. Callers only read snapshots of them and
/// change them indirectly by submitting orders. Status transitions are queued
/// by the gateway and handed out through `poll_updates`, in the order they
/// happened.
pub trait ExecutionGateway {
    /// The name of the gateway (e.g., "PaperGateway").
    fn name(&self) -> &'static str;

    /// Cash available in `currency`.
    ///
    /// Fails with `Error::WalletLookup` for a currency the wallet never held;
    /// an unfunded currency is not the same as a zero balance.
    fn available_cash(&self, currency: &str) -> Result<Decimal>;

    /// The open position for `symbol`, or `None` if flat.
    fn position(&self, symbol: &Symbol) -> Option<Position>;

    /// Submits a market order.
    fn submit_order(&mut self, intent: &OrderIntent) -> Result<OrderRef>;

    /// Submits a market order that flattens the whole position for `symbol`.
    fn close_position(&mut self, symbol: &Symbol) -> Result<OrderRef>;

    /// Drains the order status transitions recorded since the last poll.
    fn poll_updates(&mut self) -> Vec<OrderUpdate>;
}
