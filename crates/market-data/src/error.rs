// In crates/market-data/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read price history: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: unrecognised timestamp '{value}'")]
    Timestamp { line: u64, value: String },

    #[error("Line {line}: invalid {field} '{value}'")]
    Price { line: u64, field: &'static str, value: String },

    #[error("Invalid bar: {0}")]
    InvalidBar(#[from] core_types::Error),

    #[error("Bar at {current} does not follow bar at {previous}; timestamps must strictly increase")]
    OutOfOrder { previous: i64, current: i64 },
}

pub type Result<T> = std::result::Result<T, Error>;
