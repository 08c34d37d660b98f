use crate::engine::account::{SettlementHandler, Trader};
use crate::engine::entry::Order;
use crate::error::SettlementError;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// All traders known to the exchange, keyed by name.
///
/// Routes each fill to the trader that owns the order.
#[derive(Debug, Clone, Default)]
pub struct Traders {
    traders: BTreeMap<String, Trader>,
}

impl Traders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `trader`, handing it back if the name is taken.
    pub fn insert(&mut self, trader: Trader) -> Result<(), Trader> {
        if self.traders.contains_key(trader.name()) {
            return Err(trader);
        }
        self.traders.insert(trader.name().to_string(), trader);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Trader> {
        self.traders.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Trader> {
        self.traders.get_mut(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trader> {
        self.traders.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.traders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.traders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }
}

impl SettlementHandler for Traders {
    fn on_filled(&mut self, order: &Order, price: Decimal) -> Result<(), SettlementError> {
        match self.traders.get_mut(&order.trader) {
            Some(trader) => trader.on_filled(order, price),
            None => Err(SettlementError::UnknownTrader {
                trader: order.trader.clone(),
                order_id: order.id.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entry::OrderSide;
    use rust_decimal_macros::dec;

    #[test]
    fn names_are_unique() {
        let mut traders = Traders::new();
        traders.insert(Trader::new("alice", dec!(1))).unwrap();
        assert!(traders.insert(Trader::new("alice", dec!(2))).is_err());
        assert_eq!(traders.len(), 1);
        assert_eq!(traders.get("alice").map(Trader::cash), Some(dec!(1)));
    }

    #[test]
    fn fills_for_unknown_traders_are_reported() {
        let mut traders = Traders::new();
        let order = Order::limit("X", "ghost", OrderSide::Buy, 1, dec!(1));
        let err = traders.on_filled(&order, dec!(1)).unwrap_err();
        assert!(matches!(err, SettlementError::UnknownTrader { .. }));
    }
}
