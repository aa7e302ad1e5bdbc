use backtester::Backtester;
use core_types::{Kline, Symbol};
use engine::ControllerSettings;
use execution::SimulationSettings;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strategies::ThreeMaSettings;

/// Flat, then a rally, then a long slide.
fn rally_then_slide() -> Vec<Decimal> {
    let mut closes = vec![dec!(1990); 70];
    closes.extend((0..10).map(|i| dec!(2000) + Decimal::from(i) * dec!(10)));
    closes.extend((1..=30).map(|i| dec!(2090) - Decimal::from(i) * dec!(30)));
    closes
}

fn klines(closes: &[Decimal]) -> Vec<Kline> {
    let mut previous = closes[0];
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = previous;
            previous = close;
            Kline {
                open_time: 1_577_836_800_000 + i as i64 * 86_400_000,
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                volume: dec!(1000),
            }
        })
        .collect()
}

fn backtester(simulation: &SimulationSettings) -> Backtester {
    Backtester::new(
        Symbol::from("ETHUSDT"),
        "USDT",
        ThreeMaSettings::default(),
        ControllerSettings::default(),
        simulation,
    )
    .unwrap()
}

#[test]
fn rally_is_bought_and_slide_is_exited() {
    let bars = klines(&rally_then_slide());
    let mut bt = backtester(&SimulationSettings::default());
    let report = bt.run(bars.iter().cloned().map(Ok)).unwrap();

    assert_eq!(report.bars, bars.len());
    assert_eq!(report.orders_submitted, 2);
    assert_eq!(report.fills, 2);
    assert_eq!(report.failures, 0);
    assert_eq!(report.trades, 1);

    // The entry signal fires on bar 70 (close 2000) and fills at bar 71's open.
    let entry = &bt.logger().fills[0].execution;
    assert_eq!(entry.quantity, dec!(12));
    assert_eq!(entry.price, dec!(2000));

    // Flat at the end: equity is cash, and the only P&L is the round trip.
    assert!(bt.logger().open_leg().is_none());
    let trade = &bt.logger().trades[0];
    assert_eq!(report.final_value, dec!(100000) + trade.pnl);
    assert_eq!(report.net_pnl, trade.pnl);
    assert_eq!(bt.logger().equity_curve.len(), bars.len());
}

#[test]
fn commission_is_charged_on_both_legs() {
    let simulation = SimulationSettings {
        commission_rate: 0.001,
        ..Default::default()
    };
    let bars = klines(&rally_then_slide());
    let mut bt = backtester(&simulation);
    let report = bt.run(bars.into_iter().map(Ok)).unwrap();

    let fees: Decimal = bt.logger().fills.iter().map(|f| f.execution.fee).sum();
    assert!(fees > Decimal::ZERO);
    assert_eq!(bt.logger().trades[0].fees, fees);
    assert_eq!(report.net_pnl, bt.logger().trades[0].pnl);
}

#[test]
fn too_short_history_never_trades() {
    let bars = klines(&vec![dec!(100); 59]);
    let mut bt = backtester(&SimulationSettings::default());
    let report = bt.run(bars.into_iter().map(Ok)).unwrap();

    assert_eq!(report.orders_submitted, 0);
    assert_eq!(report.final_value, dec!(100000));
    assert_eq!(report.max_drawdown, Decimal::ZERO);
}

#[test]
fn out_of_order_feed_aborts_the_run() {
    let mut bars = klines(&rally_then_slide());
    bars.swap(10, 11);
    let mut bt = backtester(&SimulationSettings::default());
    let err = bt.run(bars.into_iter().map(Ok)).unwrap_err();
    assert!(err.to_string().contains("bar #12"), "{err:#}");
}
