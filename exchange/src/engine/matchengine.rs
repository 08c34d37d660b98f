//! Match Engine Module
//!
//! Runs call-auction clearing rounds over the order book. Each symbol is
//! cleared independently: a price is discovered, published to the market
//! registry, and every order that accepts that price is executed in full.

use crate::engine::account::SettlementHandler;
use crate::engine::data::OrderBook;
use crate::engine::entry::{Fill, Order, OrderSide};
use crate::engine::market::MarketRegistry;
use crate::engine::matchlogic::{discover_price, split_executable, PriceDiscovery, PriceKind};
use crate::metrics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of one symbol's clearing pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearingReport {
    pub symbol: String,
    /// Price published to the registry
    pub price: Decimal,
    pub kind: PriceKind,
    /// Tradable volume at `price` according to the curves
    pub volume: u64,
    /// Sell fills first, then buy fills, each in arrival order
    pub fills: Vec<Fill>,
    pub settlement_failures: usize,
}

impl ClearingReport {
    fn new(symbol: &str, discovery: &PriceDiscovery) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: discovery.price,
            kind: discovery.kind,
            volume: discovery.volume,
            fills: Vec::new(),
            settlement_failures: 0,
        }
    }

    /// Shares sold this pass. Executions are whole-order, so this may differ
    /// from `executed_demand`.
    pub fn executed_supply(&self) -> u64 {
        self.executed(OrderSide::Sell)
    }

    pub fn executed_demand(&self) -> u64 {
        self.executed(OrderSide::Buy)
    }

    fn executed(&self, side: OrderSide) -> u64 {
        self.fills
            .iter()
            .filter(|f| f.side == side)
            .fold(0u64, |total, f| total.saturating_add(f.size))
    }

    /// Notifies each order's owner and records the fill. Settlement errors
    /// are logged and counted; the remaining orders are still processed.
    fn execute(&mut self, orders: Vec<Order>, settlement: &mut dyn SettlementHandler) {
        for order in orders {
            let settled = match settlement.on_filled(&order, self.price) {
                Ok(()) => true,
                Err(e) => {
                    log::error!("settlement failed for order {}: {}", order.id, e);
                    metrics::SETTLEMENT_FAILURES.inc();
                    self.settlement_failures += 1;
                    false
                }
            };
            metrics::FILLS_EXECUTED
                .with_label_values(&[order.side.as_str()])
                .inc();
            self.fills.push(Fill::new(&order, self.price, settled));
        }
    }
}

/// The matching engine owns the order book and clears it one symbol at a time
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    book: OrderBook,
    /// Number of completed rounds
    round: u64,
}

impl MatchEngine {
    pub fn new() -> MatchEngine {
        MatchEngine::default()
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut OrderBook {
        &mut self.book
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    /// Clears every symbol the registry lists, in name order.
    ///
    /// # Returns
    /// Reports of the symbols that produced a price
    pub fn run_round(
        &mut self,
        market: &mut dyn MarketRegistry,
        settlement: &mut dyn SettlementHandler,
    ) -> Vec<ClearingReport> {
        self.round += 1;
        let mut reports = Vec::new();
        for symbol in market.list_symbols() {
            if let Some(report) = self.clear_symbol(&symbol, market, settlement) {
                reports.push(report);
            }
        }
        log::info!(
            "round {}: {} symbols priced, {} fills, {} orders resting",
            self.round,
            reports.len(),
            reports.iter().map(|r| r.fills.len()).sum::<usize>(),
            self.book.len()
        );
        reports
    }

    /// Runs one clearing pass for `symbol`.
    ///
    /// Skips the symbol (returns `None`, publishes nothing) when either side
    /// is empty. Otherwise publishes the discovered price, executes every
    /// sell at or below it and every buy at or above it, and writes the
    /// unexecuted orders back to the book.
    pub fn clear_symbol(
        &mut self,
        symbol: &str,
        market: &mut dyn MarketRegistry,
        settlement: &mut dyn SettlementHandler,
    ) -> Option<ClearingReport> {
        metrics::record_clearing(|| self.clear(symbol, market, settlement))
    }

    fn clear(
        &mut self,
        symbol: &str,
        market: &mut dyn MarketRegistry,
        settlement: &mut dyn SettlementHandler,
    ) -> Option<ClearingReport> {
        let buys = self.book.buy_orders(symbol);
        let sells = self.book.sell_orders(symbol);
        if buys.is_empty() || sells.is_empty() {
            log::debug!(
                "{}: {} buys, {} sells, nothing to clear",
                symbol,
                buys.len(),
                sells.len()
            );
            return None;
        }

        let Some(discovery) = discover_price(buys, sells, market.reference_price(symbol)) else {
            log::warn!("{}: only market orders and no reference price", symbol);
            return None;
        };

        market.set_price(symbol, discovery.price);
        metrics::PRICES_PUBLISHED
            .with_label_values(&[discovery.kind.as_str()])
            .inc();
        log::info!(
            "{} clears at {} ({}, volume {})",
            symbol,
            discovery.price,
            discovery.kind.as_str(),
            discovery.volume
        );

        let (buys, sells) = self.book.take(symbol);
        let mut report = ClearingReport::new(symbol, &discovery);

        let (sold, resting_sells) = split_executable(sells, discovery.price);
        report.execute(sold, settlement);
        let (bought, resting_buys) = split_executable(buys, discovery.price);
        report.execute(bought, settlement);

        if report.executed_supply() != report.executed_demand() {
            log::debug!(
                "{}: executed supply {} != executed demand {}",
                symbol,
                report.executed_supply(),
                report.executed_demand()
            );
        }

        self.book.restore(symbol, resting_buys, resting_sells);
        Some(report)
    }
}
