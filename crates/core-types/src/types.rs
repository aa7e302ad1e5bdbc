// In crates/core-types/src/types.rs

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A trading pair identifier (e.g., "ETHUSDT").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single price bar. Immutable once produced by a market data feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kline {
    /// Bar open time in epoch milliseconds.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Kline {
    /// The bar's open time as a UTC timestamp.
    ///
    /// Out-of-range millisecond values fall back to the Unix epoch.
    pub fn timestamp(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.open_time)
            .single()
            .unwrap_or_default()
    }

    /// Checks that prices are positive and that high/low bracket open/close.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Error::InvalidKline {
            open_time: self.open_time,
            reason: reason.to_string(),
        };

        if self.open <= Decimal::ZERO
            || self.high <= Decimal::ZERO
            || self.low <= Decimal::ZERO
            || self.close <= Decimal::ZERO
        {
            return Err(invalid("prices must be positive"));
        }
        if self.volume < Decimal::ZERO {
            return Err(invalid("volume must not be negative"));
        }
        if self.high < self.low {
            return Err(invalid("high is below low"));
        }
        if self.open > self.high || self.close > self.high {
            return Err(invalid("open/close above high"));
        }
        if self.open < self.low || self.close < self.low {
            return Err(invalid("open/close below low"));
        }
        Ok(())
    }
}

/// The direction of a position or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// The side of the order that flattens a position on this side.
    pub fn opposite(self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }

    /// The exchange verb for an order on this side.
    pub fn verb(self) -> &'static str {
        match self {
            Side::Long => "BUY",
            Side::Short => "SELL",
        }
    }
}

/// An open position, as reported by the execution gateway.
///
/// A flat book is represented by the absence of a `Position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub side: Side,
    /// Always positive; direction is carried by `side`.
    pub quantity: Decimal,
    pub entry_price: Decimal,
}

impl Position {
    /// Quantity with the sign of the side (negative for shorts).
    pub fn signed_quantity(&self) -> Decimal {
        match self.side {
            Side::Long => self.quantity,
            Side::Short => -self.quantity,
        }
    }
}

/// Handle assigned by the gateway to a submitted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderRef(pub u64);

impl fmt::Display for OrderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A request for a market order, not yet confirmed by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub symbol: Symbol,
    pub side: Side,
    pub quantity: Decimal,
}

/// Every status an order can report over its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Submitted,
    Accepted,
    PartiallyFilled,
    Filled,
    Canceled,
    Expired,
    MarginCall,
    Rejected,
}

impl OrderStatus {
    /// Some or all of the order quantity executed.
    pub fn is_executed(self) -> bool {
        matches!(self, OrderStatus::PartiallyFilled | OrderStatus::Filled)
    }

    /// The order ended without executing.
    pub fn is_failed(self) -> bool {
        matches!(
            self,
            OrderStatus::Canceled
                | OrderStatus::Expired
                | OrderStatus::MarginCall
                | OrderStatus::Rejected
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Created => "Created",
            OrderStatus::Submitted => "Submitted",
            OrderStatus::Accepted => "Accepted",
            OrderStatus::PartiallyFilled => "Partial",
            OrderStatus::Filled => "Completed",
            OrderStatus::Canceled => "Canceled",
            OrderStatus::Expired => "Expired",
            OrderStatus::MarginCall => "Margin",
            OrderStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The details of an executed (partial or full) fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub symbol: Symbol,
    pub side: Side,
    pub price: Decimal,
    pub quantity: Decimal,
    /// Notional value of the fill (`price * quantity`).
    pub value: Decimal,
    pub fee: Decimal,
}

/// A status transition for a submitted order, reported by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub order: OrderRef,
    pub symbol: Symbol,
    pub side: Side,
    pub status: OrderStatus,
    /// Present for `PartiallyFilled` and `Filled`.
    pub execution: Option<Execution>,
    /// Venue-provided explanation for failed orders.
    pub reason: Option<String>,
}
