use crate::engine::entry::{Order, OrderSide};
use crate::engine::matchlogic::DepthCurve;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// How a clearing price was arrived at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceKind {
    /// Supply and demand intersect; the price maximises tradable volume.
    Crossed,
    /// No candidate has tradable volume; the price is the mean of all
    /// candidate prices. Orders whose limit accepts that mean still execute,
    /// which can leave only one side trading.
    NoCross,
    /// Only market orders are present; the registry's reference price is used.
    Reference,
}

impl PriceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceKind::Crossed => "crossed",
            PriceKind::NoCross => "no_cross",
            PriceKind::Reference => "reference",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceDiscovery {
    pub price: Decimal,
    pub kind: PriceKind,
    /// min(supply, demand) at `price`.
    pub volume: u64,
}

/// Finds the uniform clearing price for one symbol.
///
/// Returns `None` when either side is empty, or when only market orders are
/// present and no `reference` price is known.
///
/// Candidates are scanned in ascending price order and only a strictly
/// larger volume replaces the best so far, so equal-volume ties resolve to
/// the lowest price.
pub fn discover_price(
    buys: &[Order],
    sells: &[Order],
    reference: Option<Decimal>,
) -> Option<PriceDiscovery> {
    if buys.is_empty() || sells.is_empty() {
        return None;
    }

    let demand = DepthCurve::build(OrderSide::Buy, buys);
    let supply = DepthCurve::build(OrderSide::Sell, sells);
    let tradable = |price: Decimal| demand.depth_at(price).min(supply.depth_at(price));

    let candidates: BTreeSet<Decimal> = demand.prices().chain(supply.prices()).collect();
    if candidates.is_empty() {
        let price = reference?;
        return Some(PriceDiscovery {
            price,
            kind: PriceKind::Reference,
            volume: tradable(price),
        });
    }

    let mut best: Option<(Decimal, u64)> = None;
    for &price in &candidates {
        let volume = tradable(price);
        if best.map_or(true, |(_, best_volume)| volume > best_volume) {
            best = Some((price, volume));
        }
    }

    match best {
        Some((price, volume)) if volume > 0 => Some(PriceDiscovery {
            price,
            kind: PriceKind::Crossed,
            volume,
        }),
        _ => Some(PriceDiscovery {
            price: mean(&candidates),
            kind: PriceKind::NoCross,
            volume: 0,
        }),
    }
}

fn mean(prices: &BTreeSet<Decimal>) -> Decimal {
    let count = Decimal::from(prices.len());
    match prices
        .iter()
        .try_fold(Decimal::ZERO, |sum, price| sum.checked_add(*price))
    {
        Some(sum) => sum / count,
        // divide first when the plain sum leaves Decimal's range
        None => prices
            .iter()
            .fold(Decimal::ZERO, |sum, price| sum.saturating_add(*price / count)),
    }
}

/// Splits `orders` into those that execute at `price` and those that stay,
/// both in their original order.
pub fn split_executable(orders: Vec<Order>, price: Decimal) -> (Vec<Order>, Vec<Order>) {
    orders.into_iter().partition(|o| o.executes_at(price))
}
