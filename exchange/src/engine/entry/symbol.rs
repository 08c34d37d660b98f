//! Listed Instrument
//!
//! A symbol known to the market registry together with its last traded
//! (reference) price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Represents a tradable instrument in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Symbol {
    /// Ticker (e.g., "SBUX")
    pub name: String,
    /// Last published clearing price, or the listing price before any round
    pub price: Decimal,
    /// Timestamp when the symbol was listed
    pub created_at: u64,
    /// Timestamp of the last price update
    pub updated_at: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

impl Symbol {
    /// Creates a symbol listed at `price`
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        let now = now_secs();
        Self {
            name: name.into(),
            price,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the reference price and returns the previous one
    pub fn reprice(&mut self, price: Decimal) -> Decimal {
        self.updated_at = now_secs();
        std::mem::replace(&mut self.price, price)
    }
}
