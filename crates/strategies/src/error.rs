// In crates/strategies/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Invalid moving-average period for {name}: {period}")]
    InvalidPeriod { name: &'static str, period: u32 },

    #[error("Periods must satisfy short < median < long (got {short}/{median}/{long})")]
    PeriodOrder { short: u32, median: u32, long: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
