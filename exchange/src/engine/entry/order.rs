use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderType {
    #[default]
    Market,
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderSide {
    #[default]
    Buy,
    Sell,
}

impl OrderSide {
    /// Whether a limit on this side allows execution at `price`.
    /// Buyers accept anything at or below their limit, sellers anything at or above.
    pub fn accepts(&self, limit: Decimal, price: Decimal) -> bool {
        match self {
            OrderSide::Buy => limit >= price,
            OrderSide::Sell => limit <= price,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub symbol: String,
    /// Name of the owning trader.
    pub trader: String,
    pub order_type: OrderType,
    pub side: OrderSide,
    /// Limit price; zero and ignored for market orders.
    pub price: Decimal,
    pub size: u64,
    pub created_at: u64,
}

impl Order {
    pub fn limit(
        symbol: impl Into<String>,
        trader: impl Into<String>,
        side: OrderSide,
        size: u64,
        price: Decimal,
    ) -> Self {
        Self::new(symbol.into(), trader.into(), OrderType::Limit, side, size, price)
    }

    pub fn market(
        symbol: impl Into<String>,
        trader: impl Into<String>,
        side: OrderSide,
        size: u64,
    ) -> Self {
        Self::new(
            symbol.into(),
            trader.into(),
            OrderType::Market,
            side,
            size,
            Decimal::ZERO,
        )
    }

    fn new(
        symbol: String,
        trader: String,
        order_type: OrderType,
        side: OrderSide,
        size: u64,
        price: Decimal,
    ) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            id: Uuid::new_v4().to_string(),
            symbol,
            trader,
            order_type,
            side,
            price,
            size,
            created_at: now,
        }
    }

    /// `None` for market orders.
    pub fn limit_price(&self) -> Option<Decimal> {
        match self.order_type {
            OrderType::Limit => Some(self.price),
            OrderType::Market => None,
        }
    }

    /// Whether this order executes when the book clears at `price`.
    /// Market orders execute at any price.
    pub fn executes_at(&self, price: Decimal) -> bool {
        match self.limit_price() {
            Some(limit) => self.side.accepts(limit, price),
            None => true,
        }
    }

    /// Cash value of the whole order at `price`, `None` when it does not fit
    /// in a `Decimal`.
    pub fn notional(&self, price: Decimal) -> Option<Decimal> {
        price.checked_mul(Decimal::from(self.size))
    }
}
