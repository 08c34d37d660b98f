use crate::engine::entry::{Order, OrderSide};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Cumulative size one side of the book offers at or better than each price.
///
/// For demand (buy) that is every buy priced at or above the level; for
/// supply (sell) every sell priced at or below it. Market orders carry no
/// level of their own and count at every price. Depths saturate at
/// `u64::MAX`.
#[derive(Debug, Clone)]
pub struct DepthCurve {
    side: OrderSide,
    market_size: u64,
    /// Ascending by price; sizes are already cumulative for `side`.
    levels: Vec<(Decimal, u64)>,
}

impl DepthCurve {
    /// Builds the curve from the orders of `side` found in `orders`.
    pub fn build(side: OrderSide, orders: &[Order]) -> Self {
        let mut market_size = 0u64;
        let mut by_price: BTreeMap<Decimal, u64> = BTreeMap::new();
        for order in orders.iter().filter(|o| o.side == side) {
            match order.limit_price() {
                Some(price) => {
                    let level = by_price.entry(price).or_insert(0);
                    *level = level.saturating_add(order.size);
                }
                None => market_size = market_size.saturating_add(order.size),
            }
        }

        let mut levels: Vec<(Decimal, u64)> = by_price.into_iter().collect();
        let mut running = market_size;
        match side {
            OrderSide::Sell => {
                for level in levels.iter_mut() {
                    running = running.saturating_add(level.1);
                    level.1 = running;
                }
            }
            OrderSide::Buy => {
                for level in levels.iter_mut().rev() {
                    running = running.saturating_add(level.1);
                    level.1 = running;
                }
            }
        }

        Self {
            side,
            market_size,
            levels,
        }
    }

    /// Distinct limit prices on this side, ascending.
    pub fn prices(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.levels.iter().map(|(price, _)| *price)
    }

    pub fn market_size(&self) -> u64 {
        self.market_size
    }

    /// Shares willing to trade if the book clears at `price`.
    pub fn depth_at(&self, price: Decimal) -> u64 {
        match self.side {
            OrderSide::Sell => {
                let idx = self.levels.partition_point(|(p, _)| *p <= price);
                if idx == 0 {
                    self.market_size
                } else {
                    self.levels[idx - 1].1
                }
            }
            OrderSide::Buy => {
                let idx = self.levels.partition_point(|(p, _)| *p < price);
                self.levels
                    .get(idx)
                    .map(|(_, size)| *size)
                    .unwrap_or(self.market_size)
            }
        }
    }
}
