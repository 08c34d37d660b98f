//! Random order flow for the simulation host and the benchmark.

use crate::config::{OrderFlowConfig, RuntimeConfig};
use crate::engine::entry::OrderSide;
use crate::engine::exchange::Exchange;
use crate::engine::market::{Market, MarketRegistry};
use crate::error::ExchangeError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Lists the configured symbols, opens the configured accounts and makes
/// their seed purchases.
pub fn build_exchange(config: &RuntimeConfig) -> Result<Exchange, ExchangeError> {
    let mut market = Market::new();
    for symbol in &config.symbols {
        market.add_symbol(&symbol.name, symbol.price)?;
    }
    let mut exchange = Exchange::new(market);
    for trader in &config.traders {
        exchange.add_trader(&trader.name, trader.cash)?;
        for holding in &trader.buy_direct {
            exchange.buy_direct(&trader.name, &holding.symbol, holding.size)?;
        }
    }
    Ok(exchange)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowStats {
    pub submitted: u64,
    pub rejected: u64,
}

/// Generates one batch of orders per round from a seeded RNG.
pub struct OrderFlow {
    config: OrderFlowConfig,
    rng: StdRng,
}

impl OrderFlow {
    pub fn new(config: OrderFlowConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Gives every trader a chance to order a random symbol. Rejections are
    /// expected (duplicate order, no shares, no cash) and only counted.
    pub fn submit_round(&mut self, exchange: &mut Exchange) -> FlowStats {
        let mut stats = FlowStats::default();
        let symbols: Vec<String> = exchange.market().list_symbols().into_iter().collect();
        if symbols.is_empty() || self.config.max_size == 0 {
            return stats;
        }
        let names: Vec<String> = exchange.traders().names().map(str::to_string).collect();

        for name in names {
            if !self.rng.gen_bool(self.config.order_probability.clamp(0.0, 1.0)) {
                continue;
            }
            let symbol = &symbols[self.rng.gen_range(0..symbols.len())];
            let held = exchange.trader(&name).map(|t| t.position(symbol)).unwrap_or(0);
            let side = if held > 0 && self.rng.gen_bool(0.5) {
                OrderSide::Sell
            } else {
                OrderSide::Buy
            };
            let size = match side {
                OrderSide::Sell => self.rng.gen_range(1..=held.min(self.config.max_size)),
                OrderSide::Buy => self.rng.gen_range(1..=self.config.max_size),
            };

            let placed = if self.rng.gen_bool(self.config.market_probability.clamp(0.0, 1.0)) {
                exchange.place_market_order(&name, symbol, size, side)
            } else {
                let reference = exchange.market().reference_price(symbol).unwrap_or_default();
                let price = self.limit_price(reference);
                exchange.place_limit_order(&name, symbol, size, price, side)
            };
            match placed {
                Ok(_) => stats.submitted += 1,
                Err(_) => stats.rejected += 1,
            }
        }
        stats
    }

    fn limit_price(&mut self, reference: Decimal) -> Decimal {
        // basis points within +/- spread
        let spread_bp = (self.config.price_spread * Decimal::from(10_000))
            .trunc()
            .to_i64()
            .unwrap_or(0)
            .max(0);
        let offset_bp = self.rng.gen_range(-spread_bp..=spread_bp);
        let factor = Decimal::ONE + Decimal::new(offset_bp, 4);
        (reference * factor).round_dp(2).max(Decimal::ZERO)
    }
}
