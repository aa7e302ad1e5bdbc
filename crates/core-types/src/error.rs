// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    #[error("Invalid kline at {open_time}: {reason}")]
    InvalidKline { open_time: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
