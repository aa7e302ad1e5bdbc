// In crates/strategies/src/lib.rs

use core_types::Kline;

pub mod error;
pub mod moving_average;
pub mod three_ma;
pub mod types;

pub use error::{Error, Result};
pub use types::{SignalFrame, ThreeMaSettings};

/// The universal interface for a signal-producing strategy.
///
/// A strategy is fed one bar at a time, in order, and keeps whatever history
/// it needs between calls. It never sees orders or positions; turning signals
/// into orders is the controller's job.
pub trait Strategy {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Number of bars that must be seen before the first `SignalFrame`.
    fn warmup_bars(&self) -> usize;

    /// Consumes the next bar. Returns `None` while the indicators warm up.
    fn assess(&mut self, kline: &Kline) -> Option<SignalFrame>;
}
