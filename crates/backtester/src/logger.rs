// In crates/backtester/src/logger.rs

use chrono::{DateTime, Utc};
use core_types::{Execution, OrderRef, OrderStatus, OrderUpdate, Side};
use rust_decimal::Decimal;
use serde::Serialize;

/// One executed fill, as reported by the gateway.
#[derive(Debug, Clone, Serialize)]
pub struct FillRecord {
    pub time: DateTime<Utc>,
    pub order: OrderRef,
    pub status: OrderStatus,
    pub execution: Execution,
}

/// An order that ended without executing.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub time: DateTime<Utc>,
    pub order: OrderRef,
    pub status: OrderStatus,
    pub reason: Option<String>,
}

/// A round trip: the fills that opened a position and the fill that closed it.
#[derive(Debug, Clone, Serialize)]
pub struct Trade {
    pub side: Side,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub quantity: Decimal,
    /// Price P&L net of entry and exit commission.
    pub pnl: Decimal,
    pub fees: Decimal,
}

/// A point in the portfolio's equity curve.
#[derive(Debug, Clone, Serialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

#[derive(Debug, Clone)]
struct OpenLeg {
    side: Side,
    entry_time: DateTime<Utc>,
    entry_price: Decimal,
    quantity: Decimal,
    fees: Decimal,
}

/// Records fills, failures, round trips and the equity curve of a run.
#[derive(Debug, Default)]
pub struct TradeLogger {
    pub fills: Vec<FillRecord>,
    pub failures: Vec<FailureRecord>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    open: Option<OpenLeg>,
}

impl TradeLogger {
    /// Creates a new, empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a point in the equity curve.
    pub fn record_equity(&mut self, timestamp: DateTime<Utc>, value: Decimal) {
        self.equity_curve.push(EquityPoint { timestamp, value });
    }

    /// Records whatever an order update means for the run's history.
    /// Pending statuses carry nothing worth keeping.
    pub fn record_update(&mut self, update: &OrderUpdate, time: DateTime<Utc>) {
        if update.status.is_failed() {
            self.failures.push(FailureRecord {
                time,
                order: update.order,
                status: update.status,
                reason: update.reason.clone(),
            });
            return;
        }
        if !update.status.is_executed() {
            return;
        }
        let Some(execution) = update.execution.clone() else {
            tracing::warn!(order = %update.order, "Fill without execution details; not recorded.");
            return;
        };
        self.apply_fill(&execution, time);
        self.fills.push(FillRecord {
            time,
            order: update.order,
            status: update.status,
            execution,
        });
    }

    fn apply_fill(&mut self, exec: &Execution, time: DateTime<Utc>) {
        match self.open.take() {
            None => {
                self.open = Some(OpenLeg {
                    side: exec.side,
                    entry_time: time,
                    entry_price: exec.price,
                    quantity: exec.quantity,
                    fees: exec.fee,
                });
            }
            Some(mut leg) if leg.side == exec.side => {
                let total = leg.quantity + exec.quantity;
                leg.entry_price = (leg.entry_price * leg.quantity + exec.price * exec.quantity) / total;
                leg.quantity = total;
                leg.fees += exec.fee;
                self.open = Some(leg);
            }
            Some(leg) => {
                let direction = match leg.side {
                    Side::Long => Decimal::ONE,
                    Side::Short => -Decimal::ONE,
                };
                let fees = leg.fees + exec.fee;
                let pnl = (exec.price - leg.entry_price) * exec.quantity * direction - fees;
                self.trades.push(Trade {
                    side: leg.side,
                    entry_time: leg.entry_time,
                    exit_time: time,
                    entry_price: leg.entry_price,
                    exit_price: exec.price,
                    quantity: exec.quantity,
                    pnl,
                    fees,
                });
            }
        }
    }

    /// The trade still open at the end of the run, if any, as `(side, quantity)`.
    pub fn open_leg(&self) -> Option<(Side, Decimal)> {
        self.open.as_ref().map(|leg| (leg.side, leg.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_types::Symbol;
    use rust_decimal_macros::dec;

    fn fill(order: u64, side: Side, price: Decimal, quantity: Decimal, fee: Decimal) -> OrderUpdate {
        OrderUpdate {
            order: OrderRef(order),
            symbol: Symbol::from("ETHUSDT"),
            side,
            status: OrderStatus::Filled,
            execution: Some(Execution {
                symbol: Symbol::from("ETHUSDT"),
                side,
                price,
                quantity,
                value: price * quantity,
                fee,
            }),
            reason: None,
        }
    }

    fn at(day: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + day * 86_400, 0).unwrap()
    }

    #[test]
    fn long_round_trip_nets_fees() {
        let mut logger = TradeLogger::new();
        logger.record_update(&fill(1, Side::Long, dec!(100), dec!(10), dec!(1)), at(0));
        assert_eq!(logger.open_leg(), Some((Side::Long, dec!(10))));

        logger.record_update(&fill(2, Side::Short, dec!(110), dec!(10), dec!(1.1)), at(3));
        assert_eq!(logger.open_leg(), None);
        assert_eq!(logger.fills.len(), 2);

        let trade = &logger.trades[0];
        assert_eq!(trade.side, Side::Long);
        assert_eq!(trade.fees, dec!(2.1));
        assert_eq!(trade.pnl, dec!(97.9));
        assert_eq!(trade.exit_time, at(3));
    }

    #[test]
    fn short_round_trip_profits_from_a_drop() {
        let mut logger = TradeLogger::new();
        logger.record_update(&fill(1, Side::Short, dec!(50), dec!(4), dec!(0)), at(0));
        logger.record_update(&fill(2, Side::Long, dec!(45), dec!(4), dec!(0)), at(1));
        assert_eq!(logger.trades[0].pnl, dec!(20));
    }

    #[test]
    fn failures_and_pending_statuses() {
        let mut logger = TradeLogger::new();
        let mut update = fill(7, Side::Long, dec!(1), dec!(1), dec!(0));
        update.status = OrderStatus::Accepted;
        update.execution = None;
        logger.record_update(&update, at(0));
        assert!(logger.fills.is_empty() && logger.failures.is_empty());

        update.status = OrderStatus::MarginCall;
        update.reason = Some("Insufficient cash".into());
        logger.record_update(&update, at(0));
        assert_eq!(logger.failures.len(), 1);
        assert_eq!(logger.failures[0].status, OrderStatus::MarginCall);
    }
}
