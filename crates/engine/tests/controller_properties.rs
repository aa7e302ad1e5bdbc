//! Randomized checks of the controller driven against the paper gateway:
//! 1. Nothing is submitted before every average has a full window.
//! 2. At most one order is ever outstanding.
//! 3. Entries are sized at a quarter of cash, rounded down.
//! 4. Replaying the same bars gives the same outcomes.

use core_types::{Kline, Side, Symbol};
use engine::{BarOutcome, ControllerSettings, ExitRule, SignalController, SkipReason};
use execution::{ExecutionGateway, PaperGateway, SimulationSettings};
use proptest::prelude::*;
use rust_decimal::Decimal;
use strategies::ThreeMaSettings;

// ── Inputs ───────────────────────────────────────────────────────────

fn arb_periods() -> impl Strategy<Value = ThreeMaSettings> {
    (1u32..6)
        .prop_flat_map(|short| (Just(short), short + 1..short + 10))
        .prop_flat_map(|(short, median)| (Just(short), Just(median), median + 1..median + 20))
        .prop_map(|(short_period, median_period, long_period)| ThreeMaSettings {
            short_period,
            median_period,
            long_period,
        })
}

/// A random walk of whole-number closes that never drops below 1.
fn arb_closes() -> impl Strategy<Value = Vec<i64>> {
    (50i64..500, prop::collection::vec(-25i64..=25, 40..250)).prop_map(|(start, steps)| {
        steps
            .into_iter()
            .scan(start, |price, step| {
                *price = (*price + step).max(1);
                Some(*price)
            })
            .collect()
    })
}

fn arb_settings() -> impl Strategy<Value = ControllerSettings> {
    (any::<bool>(), prop_oneof![Just(ExitRule::OpposingRegime), Just(ExitRule::Crossover)])
        .prop_map(|(allow_short, exit_rule)| ControllerSettings {
            verbose: false,
            allow_short,
            exit_rule,
        })
}

fn bars(closes: &[i64]) -> Vec<Kline> {
    let mut previous = closes.first().copied().unwrap_or(1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = Decimal::from(previous);
            previous = close;
            let close = Decimal::from(close);
            Kline {
                open_time: 1_600_000_000_000 + i as i64 * 86_400_000,
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                volume: Decimal::from(100),
            }
        })
        .collect()
}

/// Runs the full bar loop and checks the per-bar invariants along the way.
fn drive(
    periods: ThreeMaSettings,
    settings: ControllerSettings,
    bars: &[Kline],
) -> Result<Vec<BarOutcome>, TestCaseError> {
    let symbol = Symbol::from("ETHUSDT");
    let sim = SimulationSettings {
        initial_cash: 100_000.0,
        ..Default::default()
    };
    let mut gateway = PaperGateway::new(&sim, "USDT").unwrap();
    let mut controller =
        SignalController::three_ma(symbol.clone(), "USDT", periods, settings).unwrap();

    let mut outcomes = Vec::with_capacity(bars.len());
    for bar in bars {
        gateway.process_bar(&symbol, bar);
        for update in gateway.poll_updates() {
            controller.on_order_update(&update);
        }

        let cash_before = gateway.available_cash("USDT").unwrap();
        let pending_before = controller.pending_order();
        let outcome = controller.on_bar(bar, &mut gateway);

        prop_assert!(gateway.queued_orders() <= 1);
        if pending_before.is_some() {
            prop_assert!(outcome.submitted().is_none());
        }
        if let Some(order) = outcome.submitted() {
            prop_assert_eq!(controller.pending_order(), Some(order));
        }
        if let BarOutcome::Entry { intent, .. } = &outcome {
            let expected = (cash_before / bar.close / Decimal::from(4)).floor();
            prop_assert_eq!(intent.quantity, expected);
            prop_assert!(intent.quantity > Decimal::ZERO);
            if !settings.allow_short {
                prop_assert_eq!(intent.side, Side::Long);
            }
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

proptest! {
    #[test]
    fn no_orders_before_warmup(
        periods in arb_periods(),
        settings in arb_settings(),
        closes in arb_closes(),
    ) {
        let bars = bars(&closes);
        let outcomes = drive(periods, settings, &bars)?;

        let warmup = (periods.long_period as usize - 1).min(outcomes.len());
        for outcome in &outcomes[..warmup] {
            prop_assert_eq!(outcome, &BarOutcome::Skipped(SkipReason::WarmingUp));
        }
        for outcome in &outcomes[warmup..] {
            prop_assert_ne!(outcome, &BarOutcome::Skipped(SkipReason::WarmingUp));
        }
    }

    #[test]
    fn at_most_one_order_in_flight(
        periods in arb_periods(),
        settings in arb_settings(),
        closes in arb_closes(),
    ) {
        // The per-bar checks live in `drive`.
        drive(periods, settings, &bars(&closes))?;
    }

    #[test]
    fn replay_is_deterministic(
        periods in arb_periods(),
        settings in arb_settings(),
        closes in arb_closes(),
    ) {
        let bars = bars(&closes);
        let first = drive(periods, settings, &bars)?;
        let second = drive(periods, settings, &bars)?;
        prop_assert_eq!(first, second);
    }
}
