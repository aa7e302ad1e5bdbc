// In crates/engine/src/lib.rs

pub mod controller;
pub mod types;
pub mod watch;

pub use controller::{SignalController, quarter_cash_size};
pub use types::{BarOutcome, ControllerSettings, ExitRule, SkipReason};
pub use watch::{BalanceWatcher, WatchSnapshot};
