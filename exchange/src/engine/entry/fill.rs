//! Fill Records
//!
//! A fill is one order executed in full by a clearing pass.

use crate::engine::entry::{Order, OrderSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Represents a whole-order execution at the round's clearing price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fill {
    /// ID of the executed order
    pub order_id: String,
    /// Trading symbol
    pub symbol: String,
    /// Owner of the executed order
    pub trader: String,
    /// Side of the executed order
    pub side: OrderSide,
    /// Clearing price the order executed at
    pub price: Decimal,
    /// Shares executed (always the full order size)
    pub size: u64,
    /// Whether the trader settled the fill without error
    pub settled: bool,
    /// Timestamp when the fill was produced
    pub created_at: SystemTime,
}

impl Fill {
    /// Builds the fill record for `order` executed at `price`
    pub fn new(order: &Order, price: Decimal, settled: bool) -> Self {
        Self {
            order_id: order.id.clone(),
            symbol: order.symbol.clone(),
            trader: order.trader.clone(),
            side: order.side,
            price,
            size: order.size,
            settled,
            created_at: SystemTime::now(),
        }
    }
}
