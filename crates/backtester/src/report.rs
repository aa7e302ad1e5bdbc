// In crates/backtester/src/report.rs

use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::Serialize;
use strategies::ThreeMaSettings;

use crate::logger::{EquityPoint, TradeLogger};

/// Summary of a single backtest run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub symbol: String,
    pub periods: ThreeMaSettings,
    pub initial_value: Decimal,
    pub final_value: Decimal,
    pub net_pnl: Decimal,
    pub return_pct: f64,
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: f64,
    pub bars: usize,
    pub orders_submitted: usize,
    pub fills: usize,
    pub failures: usize,
    /// Closed round trips.
    pub trades: usize,
    pub win_rate: f64,
}

impl RunReport {
    pub(crate) fn build(
        symbol: String,
        periods: ThreeMaSettings,
        initial_value: Decimal,
        final_value: Decimal,
        bars: usize,
        orders_submitted: usize,
        logger: &TradeLogger,
    ) -> Self {
        let net_pnl = final_value - initial_value;
        let return_pct = if initial_value > Decimal::ZERO {
            (net_pnl / initial_value).to_f64().unwrap_or(0.0) * 100.0
        } else {
            0.0
        };
        let (max_drawdown, max_drawdown_pct) = max_drawdown(initial_value, &logger.equity_curve);

        let trades = logger.trades.len();
        let winners = logger.trades.iter().filter(|t| t.pnl > Decimal::ZERO).count();
        let win_rate = if trades > 0 {
            winners as f64 / trades as f64 * 100.0
        } else {
            0.0
        };

        Self {
            symbol,
            periods,
            initial_value,
            final_value,
            net_pnl,
            return_pct,
            max_drawdown,
            max_drawdown_pct,
            bars,
            orders_submitted,
            fills: logger.fills.len(),
            failures: logger.failures.len(),
            trades,
            win_rate,
        }
    }
}

/// Largest peak-to-trough fall of the equity curve, absolute and as a
/// percentage of the peak it fell from.
pub fn max_drawdown(initial_value: Decimal, curve: &[EquityPoint]) -> (Decimal, f64) {
    let mut peak = initial_value;
    let mut worst = Decimal::ZERO;
    let mut worst_pct = 0.0;
    for point in curve {
        peak = peak.max(point.value);
        let drawdown = peak - point.value;
        if drawdown > worst {
            worst = drawdown;
            if peak > Decimal::ZERO {
                worst_pct = (drawdown / peak).to_f64().unwrap_or(0.0) * 100.0;
            }
        }
    }
    (worst, worst_pct)
}

/// Prints the report in a readable format.
pub fn print_report(report: &RunReport) {
    let p = &report.periods;
    println!("\n--- Backtest Report: {} ---", report.symbol);
    println!("-----------------------------------");
    println!(
        "MA Periods:            {} / {} / {}",
        p.short_period, p.median_period, p.long_period
    );
    println!("Starting Value:        ${:.2}", report.initial_value);
    println!("Ending Value:          ${:.2}", report.final_value);
    println!("Net P&L:               ${:.2} ({:.2}%)", report.net_pnl, report.return_pct);
    println!("Max Drawdown:          ${:.2} ({:.2}%)", report.max_drawdown, report.max_drawdown_pct);
    println!("-----------------------------------");
    println!("Bars:                  {}", report.bars);
    println!("Orders Submitted:      {}", report.orders_submitted);
    println!("Fills:                 {}", report.fills);
    println!("Failed Orders:         {}", report.failures);
    println!("Closed Trades:         {}", report.trades);
    println!("Win Rate:              {:.2}%", report.win_rate);
    println!("-----------------------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn curve(values: &[Decimal]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| EquityPoint {
                timestamp: Utc.timestamp_opt(i as i64 * 60, 0).unwrap(),
                value: *v,
            })
            .collect()
    }

    #[test]
    fn drawdown_is_measured_from_the_running_peak() {
        let points = curve(&[dec!(100), dec!(120), dec!(90), dec!(130), dec!(117)]);
        let (abs, pct) = max_drawdown(dec!(100), &points);
        assert_eq!(abs, dec!(30));
        assert!((pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn monotonic_curve_has_no_drawdown() {
        let points = curve(&[dec!(100), dec!(101), dec!(102)]);
        assert_eq!(max_drawdown(dec!(100), &points), (Decimal::ZERO, 0.0));
    }
}
