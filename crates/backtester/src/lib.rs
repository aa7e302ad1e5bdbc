// In crates/backtester/src/lib.rs

pub mod logger;
pub mod report;

use anyhow::Context;
use core_types::{Kline, Symbol};
use engine::{ControllerSettings, SignalController};
use execution::{ExecutionGateway, PaperGateway, SimulationSettings};
use strategies::ThreeMaSettings;

pub use logger::TradeLogger;
pub use report::{RunReport, print_report};

/// Replays a price history through a controller and a paper venue.
pub struct Backtester {
    symbol: Symbol,
    periods: ThreeMaSettings,
    controller: SignalController,
    gateway: PaperGateway,
    logger: TradeLogger,
}

impl Backtester {
    pub fn new(
        symbol: Symbol,
        quote_currency: &str,
        periods: ThreeMaSettings,
        controller_settings: ControllerSettings,
        simulation: &SimulationSettings,
    ) -> anyhow::Result<Self> {
        let controller =
            SignalController::three_ma(symbol.clone(), quote_currency, periods, controller_settings)
                .context("Invalid moving-average periods")?;
        let gateway =
            PaperGateway::new(simulation, quote_currency).context("Invalid simulation settings")?;
        Ok(Self {
            symbol,
            periods,
            controller,
            gateway,
            logger: TradeLogger::new(),
        })
    }

    pub fn logger(&self) -> &TradeLogger {
        &self.logger
    }

    pub fn gateway(&self) -> &PaperGateway {
        &self.gateway
    }

    /// Runs the whole feed. Stops at the first unreadable or out-of-order bar.
    pub fn run<I>(&mut self, feed: I) -> anyhow::Result<RunReport>
    where
        I: IntoIterator<Item = market_data::Result<Kline>>,
    {
        let initial_value = self.gateway.portfolio_value();
        tracing::info!(
            symbol = %self.symbol,
            gateway = self.gateway.name(),
            "Starting Portfolio Value: {:.2}",
            initial_value
        );

        let mut bars = 0usize;
        let mut orders_submitted = 0usize;

        for bar in market_data::ordered(feed) {
            let bar = bar.with_context(|| format!("Failed to read bar #{}", bars + 1))?;
            let time = bar.timestamp();

            // --- 1. Let the venue fill what was queued on the previous bar ---
            self.gateway.process_bar(&self.symbol, &bar);

            // --- 2. Deliver status transitions ---
            for update in self.gateway.poll_updates() {
                self.logger.record_update(&update, time);
                self.controller.on_order_update(&update);
            }

            // --- 3. Evaluate this bar ---
            let outcome = self.controller.on_bar(&bar, &mut self.gateway);
            if outcome.submitted().is_some() {
                orders_submitted += 1;
            }

            self.logger.record_equity(time, self.gateway.portfolio_value());
            bars += 1;
        }

        // Orders submitted on the last bar never fill; hand over their acceptance.
        for update in self.gateway.poll_updates() {
            self.controller.on_order_update(&update);
        }
        if let Some(order) = self.controller.pending_order() {
            tracing::warn!(order = %order, "Run ended with an order still in flight.");
        }

        let final_value = self.gateway.portfolio_value();
        tracing::info!(
            short_period = self.periods.short_period,
            median_period = self.periods.median_period,
            long_period = self.periods.long_period,
            "(MA Period {}, {}, {}) Ending Value {:.2}",
            self.periods.short_period,
            self.periods.median_period,
            self.periods.long_period,
            final_value
        );

        Ok(RunReport::build(
            self.symbol.to_string(),
            self.periods,
            initial_value,
            final_value,
            bars,
            orders_submitted,
            &self.logger,
        ))
    }
}
