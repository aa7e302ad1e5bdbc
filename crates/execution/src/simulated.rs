// In crates/execution/src/simulated.rs

use std::collections::{HashMap, VecDeque};

use crate::types::{Portfolio, SimulationSettings};
use crate::{Error, ExecutionGateway, Result};
use core_types::{
    Execution, Kline, OrderIntent, OrderRef, OrderStatus, OrderUpdate, Position, Side, Symbol,
};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, Copy, PartialEq)]
enum OrderKind {
    Entry,
    Close,
}

#[derive(Debug, Clone)]
struct QueuedOrder {
    order: OrderRef,
    symbol: Symbol,
    side: Side,
    quantity: Decimal,
    kind: OrderKind,
}

/// A paper-trading venue driven by bars.
///
/// Orders are accepted immediately and filled at the open of the next bar
/// passed to `process_bar`. Every status transition is queued and returned by
/// `poll_updates`.
#[derive(Debug)]
pub struct PaperGateway {
    commission_rate: Decimal,
    slippage: Decimal,
    portfolio: Portfolio,
    queued: Vec<QueuedOrder>,
    updates: VecDeque<OrderUpdate>,
    marks: HashMap<Symbol, Decimal>,
    next_ref: u64,
}

impl PaperGateway {
    pub fn new(settings: &SimulationSettings, quote_currency: &str) -> Result<Self> {
        let decimal = |name: &str, value: f64| {
            Decimal::from_f64(value)
                .ok_or_else(|| Error::InvalidSettings(format!("{name} is not a finite number: {value}")))
        };

        let initial_cash = decimal("initial_cash", settings.initial_cash)?;
        let commission_rate = decimal("commission_rate", settings.commission_rate)?;
        let slippage = decimal("slippage_percent", settings.slippage_percent)?;

        if initial_cash < Decimal::ZERO {
            return Err(Error::InvalidSettings("initial_cash must not be negative".into()));
        }
        for (name, rate) in [("commission_rate", commission_rate), ("slippage_percent", slippage)] {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(Error::InvalidSettings(format!("{name} must be in [0, 1)")));
            }
        }

        let mut portfolio = Portfolio::new(quote_currency, initial_cash);
        for (currency, balance) in &settings.extra_balances {
            if currency == quote_currency {
                continue;
            }
            portfolio
                .wallet
                .insert(currency.clone(), decimal(currency.as_str(), *balance)?);
        }

        Ok(Self {
            commission_rate,
            slippage,
            portfolio,
            queued: Vec::new(),
            updates: VecDeque::new(),
            marks: HashMap::new(),
            next_ref: 1,
        })
    }

    /// Cash plus open positions marked at the last seen open/close.
    pub fn portfolio_value(&self) -> Decimal {
        self.portfolio.total_value(&self.marks)
    }

    /// Number of accepted orders still waiting for a bar to fill against.
    pub fn queued_orders(&self) -> usize {
        self.queued.len()
    }

    /// Fills every queued order for `symbol` at this bar's open, then marks the
    /// book at the bar's close.
    pub fn process_bar(&mut self, symbol: &Symbol, bar: &Kline) {
        let (due, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.queued)
            .into_iter()
            .partition(|q| &q.symbol == symbol);
        self.queued = rest;

        self.marks.insert(symbol.clone(), bar.open);
        for order in due {
            match order.kind {
                OrderKind::Entry => self.fill_entry(order, bar.open),
                OrderKind::Close => self.fill_close(order, bar.open),
            }
        }
        self.marks.insert(symbol.clone(), bar.close);
    }

    fn allocate_ref(&mut self) -> OrderRef {
        let order = OrderRef(self.next_ref);
        self.next_ref += 1;
        order
    }

    fn push_update(
        &mut self,
        order: &QueuedOrder,
        status: OrderStatus,
        execution: Option<Execution>,
        reason: Option<String>,
    ) {
        self.updates.push_back(OrderUpdate {
            order: order.order,
            symbol: order.symbol.clone(),
            side: order.side,
            status,
            execution,
            reason,
        });
    }

    fn accept(&mut self, order: QueuedOrder) -> OrderRef {
        let handle = order.order;
        self.push_update(&order, OrderStatus::Submitted, None, None);
        self.push_update(&order, OrderStatus::Accepted, None, None);
        self.queued.push(order);
        handle
    }

    fn fill_price(&self, side: Side, reference: Decimal) -> Decimal {
        // Slippage always works against the order.
        match side {
            Side::Long => reference * (dec!(1) + self.slippage),
            Side::Short => reference * (dec!(1) - self.slippage),
        }
    }

    /// Processes an entry order (opening or adding to a position).
    fn fill_entry(&mut self, order: QueuedOrder, reference: Decimal) {
        let opposite_open = self
            .portfolio
            .open_positions
            .get(&order.symbol)
            .is_some_and(|open| open.side != order.side);
        if opposite_open {
            let reason = "An opposite position is open; close it first.".to_string();
            tracing::warn!(order = %order.order, symbol = %order.symbol, "{}", reason);
            self.push_update(&order, OrderStatus::Rejected, None, Some(reason));
            return;
        }

        // --- 1. Calculate Execution Price and Costs ---
        let price = self.fill_price(order.side, reference);
        let value = order.quantity * price;
        let fee = value * self.commission_rate;

        // --- 2. Check Cash ---
        let cash = self.portfolio.cash();
        let required = match order.side {
            Side::Long => value + fee,
            Side::Short => fee,
        };
        if cash < required {
            let reason = format!("Insufficient cash: required {required}, available {cash}");
            tracing::warn!(order = %order.order, symbol = %order.symbol, "{}", reason);
            self.push_update(&order, OrderStatus::MarginCall, None, Some(reason));
            return;
        }

        // --- 3. Update Portfolio State ---
        match order.side {
            Side::Long => self.portfolio.adjust_cash(-(value + fee)),
            Side::Short => self.portfolio.adjust_cash(value - fee),
        }
        self.portfolio
            .open_positions
            .entry(order.symbol.clone())
            .and_modify(|pos| {
                let total = pos.quantity + order.quantity;
                pos.entry_price = (pos.entry_price * pos.quantity + price * order.quantity) / total;
                pos.quantity = total;
            })
            .or_insert_with(|| Position {
                symbol: order.symbol.clone(),
                side: order.side,
                quantity: order.quantity,
                entry_price: price,
            });

        // --- 4. Report the Fill ---
        let execution = Execution {
            symbol: order.symbol.clone(),
            side: order.side,
            price,
            quantity: order.quantity,
            value,
            fee,
        };
        tracing::debug!(?execution, "Paper entry filled.");
        self.push_update(&order, OrderStatus::Filled, Some(execution), None);
    }

    /// Processes a closing order.
    fn fill_close(&mut self, order: QueuedOrder, reference: Decimal) {
        // --- 1. Find the Position to Close ---
        let Some(open) = self.portfolio.open_positions.remove(&order.symbol) else {
            let reason = format!("No open position found for symbol {}", order.symbol);
            tracing::warn!(order = %order.order, "{}", reason);
            self.push_update(&order, OrderStatus::Rejected, None, Some(reason));
            return;
        };

        // --- 2. Calculate Execution Price and Costs ---
        let price = self.fill_price(order.side, reference);
        let value = open.quantity * price;
        let fee = value * self.commission_rate;

        // --- 3. Update Portfolio State ---
        match open.side {
            // Selling a long returns the proceeds.
            Side::Long => self.portfolio.adjust_cash(value - fee),
            // Buying back a short pays for it.
            Side::Short => self.portfolio.adjust_cash(-(value + fee)),
        }

        let execution = Execution {
            symbol: order.symbol.clone(),
            side: order.side, // The side of the *closing order*
            price,
            quantity: open.quantity,
            value,
            fee,
        };
        tracing::debug!(?execution, entry_price = %open.entry_price, "Paper close filled.");
        self.push_update(&order, OrderStatus::Filled, Some(execution), None);
    }
}

impl ExecutionGateway for PaperGateway {
    fn name(&self) -> &'static str {
        "PaperGateway"
    }

    fn available_cash(&self, currency: &str) -> Result<Decimal> {
        self.portfolio
            .wallet
            .get(currency)
            .copied()
            .ok_or_else(|| Error::WalletLookup {
                currency: currency.to_string(),
            })
    }

    fn position(&self, symbol: &Symbol) -> Option<Position> {
        self.portfolio.open_positions.get(symbol).cloned()
    }

    fn submit_order(&mut self, intent: &OrderIntent) -> Result<OrderRef> {
        let order = QueuedOrder {
            order: self.allocate_ref(),
            symbol: intent.symbol.clone(),
            side: intent.side,
            quantity: intent.quantity,
            kind: OrderKind::Entry,
        };

        if intent.quantity <= Decimal::ZERO {
            let handle = order.order;
            self.push_update(&order, OrderStatus::Submitted, None, None);
            self.push_update(
                &order,
                OrderStatus::Rejected,
                None,
                Some(format!("Quantity must be positive, got {}", intent.quantity)),
            );
            return Ok(handle);
        }

        Ok(self.accept(order))
    }

    fn close_position(&mut self, symbol: &Symbol) -> Result<OrderRef> {
        let (side, quantity) = self
            .portfolio
            .open_positions
            .get(symbol)
            .map(|open| (open.side.opposite(), open.quantity))
            .ok_or_else(|| Error::NoOpenPosition {
                symbol: symbol.0.clone(),
            })?;

        let order = QueuedOrder {
            order: self.allocate_ref(),
            symbol: symbol.clone(),
            side,
            quantity,
            kind: OrderKind::Close,
        };
        Ok(self.accept(order))
    }

    fn poll_updates(&mut self) -> Vec<OrderUpdate> {
        self.updates.drain(..).collect()
    }
}
