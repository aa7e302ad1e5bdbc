// In crates/engine/src/watch.rs

use core_types::Kline;
use execution::ExecutionGateway;
use rust_decimal::Decimal;
use strategies::moving_average::RollingMean;

/// One bar as seen by the watcher, with the balances read alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchSnapshot {
    pub bar: Kline,
    /// Simple moving average of the close, `None` until its window is full.
    pub sma: Option<Decimal>,
    /// `None` for a currency the wallet could not report.
    pub balances: Vec<(String, Option<Decimal>)>,
}

/// Prints market data, a moving average of the close and wallet balances for
/// every bar. Never trades.
pub struct BalanceWatcher {
    currencies: Vec<String>,
    sma: RollingMean,
}

impl BalanceWatcher {
    pub fn new(currencies: Vec<String>, sma_period: u32) -> strategies::Result<Self> {
        tracing::info!(?currencies, sma_period, "Creating balance watcher.");
        Ok(Self {
            currencies,
            sma: RollingMean::new("sma_period", sma_period)?,
        })
    }

    pub fn on_bar(&mut self, bar: &Kline, gateway: &dyn ExecutionGateway) -> WatchSnapshot {
        let sma = self.sma.update(bar.close);
        tracing::info!(
            time = %bar.timestamp(),
            open = %bar.open,
            high = %bar.high,
            low = %bar.low,
            close = %bar.close,
            volume = %bar.volume,
            sma = ?sma,
            "Bar"
        );

        let balances = self
            .currencies
            .iter()
            .map(|currency| match gateway.available_cash(currency) {
                Ok(balance) => {
                    tracing::info!(currency = %currency, %balance, "Wallet balance");
                    (currency.clone(), Some(balance))
                }
                Err(e) => {
                    tracing::warn!(currency = %currency, error = %e, "Wallet balance unavailable.");
                    (currency.clone(), None)
                }
            })
            .collect();

        WatchSnapshot {
            bar: bar.clone(),
            sma,
            balances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use execution::{PaperGateway, SimulationSettings};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn bar(i: i64, close: Decimal) -> Kline {
        Kline {
            open_time: 1_700_000_000_000 + i * 60_000,
            open: close,
            high: close + dec!(1),
            low: close - dec!(1),
            close,
            volume: dec!(3),
        }
    }

    #[test]
    fn unfunded_currency_is_reported_as_missing() {
        let settings = SimulationSettings {
            initial_cash: 2500.0,
            extra_balances: HashMap::from([("BTC".to_string(), 0.5)]),
            ..Default::default()
        };
        let gateway = PaperGateway::new(&settings, "USDT").unwrap();
        let mut watcher =
            BalanceWatcher::new(vec!["USDT".into(), "BTC".into(), "DOGE".into()], 21).unwrap();

        let bar = bar(0, dec!(10.5));
        let snapshot = watcher.on_bar(&bar, &gateway);

        assert_eq!(snapshot.bar, bar);
        assert_eq!(
            snapshot.balances,
            vec![
                ("USDT".to_string(), Some(dec!(2500))),
                ("BTC".to_string(), Some(dec!(0.5))),
                ("DOGE".to_string(), None),
            ]
        );
    }

    #[test]
    fn sma_reports_once_21_closes_are_seen() {
        let gateway = PaperGateway::new(&SimulationSettings::default(), "USDT").unwrap();
        let mut watcher = BalanceWatcher::new(vec!["USDT".into()], 21).unwrap();

        for i in 0..20 {
            let snapshot = watcher.on_bar(&bar(i, Decimal::from(100 + i)), &gateway);
            assert_eq!(snapshot.sma, None);
        }
        // Closes 100..=120 average to 110.
        let snapshot = watcher.on_bar(&bar(20, dec!(120)), &gateway);
        assert_eq!(snapshot.sma, Some(dec!(110)));
        // The window rolls: 101..=121.
        let snapshot = watcher.on_bar(&bar(21, dec!(121)), &gateway);
        assert_eq!(snapshot.sma, Some(dec!(111)));
    }

    #[test]
    fn zero_sma_period_is_rejected() {
        assert!(BalanceWatcher::new(vec!["USDT".into()], 0).is_err());
    }
}
