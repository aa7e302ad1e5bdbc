// In crates/execution/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum Error {
    /// The wallet has never been funded in this currency.
    #[error("No wallet balance for currency {currency}")]
    WalletLookup { currency: String },

    #[error("No open position found for symbol {symbol}")]
    NoOpenPosition { symbol: String },

    #[error("Invalid order quantity: {quantity}")]
    InvalidQuantity { quantity: String },

    #[error("Invalid simulation settings: {0}")]
    InvalidSettings(String),
}

pub type Result<T> = std::result::Result<T, Error>;
