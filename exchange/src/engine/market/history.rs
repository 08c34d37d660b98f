//! Price History
//!
//! Append-only log of every reference price change published to the registry.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// One published price change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    /// Position in the history, starting at 0
    pub seq: u64,
    pub symbol: String,
    pub previous: Decimal,
    pub price: Decimal,
    pub recorded_at: SystemTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketHistory {
    updates: Vec<PriceUpdate>,
}

impl MarketHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a price change and returns the stored record.
    pub fn record(&mut self, symbol: &str, previous: Decimal, price: Decimal) -> &PriceUpdate {
        let update = PriceUpdate {
            seq: self.updates.len() as u64,
            symbol: symbol.to_string(),
            previous,
            price,
            recorded_at: SystemTime::now(),
        };
        self.updates.push(update);
        &self.updates[self.updates.len() - 1]
    }

    pub fn for_symbol<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a PriceUpdate> + 'a {
        self.updates.iter().filter(move |u| u.symbol == symbol)
    }

    pub fn last(&self, symbol: &str) -> Option<&PriceUpdate> {
        self.updates.iter().rev().find(|u| u.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}
