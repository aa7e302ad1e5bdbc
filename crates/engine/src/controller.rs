// In crates/engine/src/controller.rs

use crate::types::{BarOutcome, ControllerSettings, ExitRule, SkipReason};
use core_types::{Kline, OrderIntent, OrderRef, OrderStatus, OrderUpdate, Position, Side, Symbol};
use execution::ExecutionGateway;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strategies::three_ma::ThreeMovingAverage;
use strategies::{SignalFrame, Strategy, ThreeMaSettings};

/// Entries commit this fraction (1/4) of available cash.
const STAKE_DIVISOR: Decimal = dec!(4);

/// Logs at INFO when the controller is verbose and at DEBUG otherwise.
macro_rules! journal {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

/// Size for a new position: a quarter of `cash` at `price`, floored to whole units.
pub fn quarter_cash_size(cash: Decimal, price: Decimal) -> Decimal {
    if cash <= Decimal::ZERO || price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    cash.checked_div(price)
        .and_then(|units| units.checked_div(STAKE_DIVISOR))
        .map(|units| units.floor())
        .unwrap_or(Decimal::ZERO)
}

/// Turns a strategy's signals into at most one order at a time.
///
/// The controller owns nothing but the strategy state and a reference to the
/// order it is waiting on. Cash and positions are read from the gateway on
/// every bar; they are never cached.
pub struct SignalController {
    symbol: Symbol,
    quote_currency: String,
    settings: ControllerSettings,
    strategy: Box<dyn Strategy + Send>,
    pending: Option<OrderRef>,
}

impl SignalController {
    pub fn new(
        symbol: Symbol,
        quote_currency: impl Into<String>,
        strategy: Box<dyn Strategy + Send>,
        settings: ControllerSettings,
    ) -> Self {
        let quote_currency = quote_currency.into();
        tracing::info!(
            symbol = %symbol,
            quote_currency = %quote_currency,
            strategy = strategy.name(),
            warmup_bars = strategy.warmup_bars(),
            ?settings,
            "Creating signal controller."
        );
        Self {
            symbol,
            quote_currency,
            settings,
            strategy,
            pending: None,
        }
    }

    /// Builds a controller around the three-moving-average strategy.
    pub fn three_ma(
        symbol: Symbol,
        quote_currency: impl Into<String>,
        periods: ThreeMaSettings,
        settings: ControllerSettings,
    ) -> strategies::Result<Self> {
        let strategy = ThreeMovingAverage::new(periods)?;
        Ok(Self::new(symbol, quote_currency, Box::new(strategy), settings))
    }

    /// The order the controller is waiting on, if any.
    pub fn pending_order(&self) -> Option<OrderRef> {
        self.pending
    }

    /// Evaluates one bar and submits at most one order to `gateway`.
    ///
    /// Never fails: problems are logged and the bar becomes a no-op.
    pub fn on_bar(&mut self, bar: &Kline, gateway: &mut dyn ExecutionGateway) -> BarOutcome {
        let verbose = self.settings.verbose;
        let date = bar.timestamp().date_naive();

        // --- 1-4. Update indicators and derive this bar's signals ---
        let Some(frame) = self.strategy.assess(bar) else {
            return BarOutcome::Skipped(SkipReason::WarmingUp);
        };

        if frame.long_entry || frame.short_entry || frame.close_long || frame.close_short {
            journal!(
                verbose,
                %date,
                close = %bar.close,
                short_ma = %frame.short_ma,
                median_ma = %frame.median_ma,
                long_ma = %frame.long_ma,
                long_entry = frame.long_entry,
                short_entry = frame.short_entry,
                close_long = frame.close_long,
                close_short = frame.close_short,
                "Signal fired."
            );
        }

        // --- 5. In-flight guard ---
        if let Some(order) = self.pending {
            journal!(verbose, %date, order = %order, "Order still in flight; no action this bar.");
            return BarOutcome::Skipped(SkipReason::OrderInFlight);
        }

        // --- 6. Exit an open position ---
        if let Some(position) = gateway.position(&self.symbol) {
            journal!(verbose, %date, side = ?position.side, size = %position.quantity, "Holding position.");
            if !self.should_exit(&position, &frame) {
                return BarOutcome::Hold(frame);
            }
            return match gateway.close_position(&self.symbol) {
                Ok(order) => {
                    journal!(verbose, %date, order = %order, side = ?position.side, size = %position.quantity, "Close position submitted.");
                    self.pending = Some(order);
                    BarOutcome::Exit { frame, order }
                }
                Err(e) => {
                    tracing::error!(%date, error = %e, gateway = gateway.name(), "Failed to submit close order.");
                    BarOutcome::Skipped(SkipReason::SubmitFailed)
                }
            };
        }

        // --- 7. Enter when flat ---
        let side = if frame.long_entry {
            Side::Long
        } else if frame.short_entry && self.settings.allow_short {
            Side::Short
        } else {
            return BarOutcome::Hold(frame);
        };

        let cash = match gateway.available_cash(&self.quote_currency) {
            Ok(cash) => cash,
            Err(e) => {
                tracing::error!(%date, error = %e, "Cannot read available cash; skipping bar.");
                return BarOutcome::Skipped(SkipReason::WalletUnavailable);
            }
        };

        let quantity = quarter_cash_size(cash, bar.close);
        if quantity.is_zero() {
            tracing::warn!(%date, %cash, close = %bar.close, "Quarter of available cash buys less than one unit; not entering.");
            return BarOutcome::Skipped(SkipReason::ZeroSize);
        }

        let intent = OrderIntent {
            symbol: self.symbol.clone(),
            side,
            quantity,
        };
        match gateway.submit_order(&intent) {
            Ok(order) => {
                journal!(verbose, %date, order = %order, side = side.verb(), size = %quantity, price = %bar.close, "Entry submitted.");
                self.pending = Some(order);
                BarOutcome::Entry { frame, order, intent }
            }
            Err(e) => {
                tracing::error!(%date, error = %e, ?intent, "Failed to submit entry order.");
                BarOutcome::Skipped(SkipReason::SubmitFailed)
            }
        }
    }

    fn should_exit(&self, position: &Position, frame: &SignalFrame) -> bool {
        match (position.side, self.settings.exit_rule) {
            (Side::Long, ExitRule::OpposingRegime) => frame.short_regime,
            (Side::Short, ExitRule::OpposingRegime) => frame.long_regime,
            (Side::Long, ExitRule::Crossover) => frame.close_long,
            (Side::Short, ExitRule::Crossover) => frame.close_short,
        }
    }

    /// Handles a status transition reported by the gateway.
    pub fn on_order_update(&mut self, update: &OrderUpdate) {
        let verbose = self.settings.verbose;

        if self.pending != Some(update.order) {
            tracing::debug!(order = %update.order, status = %update.status, "Ignoring update for an order this controller is not waiting on.");
            return;
        }

        match update.status {
            OrderStatus::Created | OrderStatus::Submitted | OrderStatus::Accepted => {
                journal!(verbose, order = %update.order, symbol = %update.symbol, status = %update.status, "Order pending.");
            }
            OrderStatus::PartiallyFilled | OrderStatus::Filled => {
                match &update.execution {
                    Some(exec) => journal!(
                        verbose,
                        status = %update.status,
                        order = %update.order,
                        symbol = %update.symbol,
                        size = %exec.quantity,
                        price = %exec.price,
                        cost = %exec.value,
                        comm = %exec.fee,
                        "{} EXECUTED",
                        update.side.verb()
                    ),
                    None => tracing::warn!(order = %update.order, status = %update.status, "Fill reported without execution details."),
                }
                self.pending = None;
            }
            OrderStatus::Canceled
            | OrderStatus::Expired
            | OrderStatus::MarginCall
            | OrderStatus::Rejected => {
                tracing::warn!(
                    order = %update.order,
                    symbol = %update.symbol,
                    status = %update.status,
                    reason = update.reason.as_deref().unwrap_or("none given"),
                    "Order did not complete."
                );
                self.pending = None;
            }
        }
    }
}
