use crate::engine::entry::{Order, OrderSide};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Outstanding orders, keyed by symbol and split by side.
///
/// Each symbol's lists keep submission order. Admission checks belong to the
/// trader; the book accepts whatever it is given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBook {
    buy_orders: HashMap<String, Vec<Order>>,  // symbol -> demand
    sell_orders: HashMap<String, Vec<Order>>, // symbol -> supply
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `order` to the end of its symbol's list for its side.
    pub fn submit(&mut self, order: Order) {
        let orders = match order.side {
            OrderSide::Buy => self.buy_orders.entry(order.symbol.clone()).or_default(),
            OrderSide::Sell => self.sell_orders.entry(order.symbol.clone()).or_default(),
        };
        orders.push(order);
    }

    pub fn buy_orders(&self, symbol: &str) -> &[Order] {
        self.buy_orders.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sell_orders(&self, symbol: &str) -> &[Order] {
        self.sell_orders.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Removes and returns `(buy, sell)` orders for `symbol`.
    pub fn take(&mut self, symbol: &str) -> (Vec<Order>, Vec<Order>) {
        (
            self.buy_orders.remove(symbol).unwrap_or_default(),
            self.sell_orders.remove(symbol).unwrap_or_default(),
        )
    }

    /// Writes back the lists for `symbol`; empty lists leave no entry behind.
    pub fn restore(&mut self, symbol: &str, buys: Vec<Order>, sells: Vec<Order>) {
        if !buys.is_empty() {
            self.buy_orders.insert(symbol.to_string(), buys);
        }
        if !sells.is_empty() {
            self.sell_orders.insert(symbol.to_string(), sells);
        }
    }

    pub fn get_order(&self, order_id: &str) -> Option<&Order> {
        self.buy_orders
            .values()
            .chain(self.sell_orders.values())
            .flatten()
            .find(|o| o.id == order_id)
    }

    /// Symbols with at least one outstanding order on either side.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.buy_orders
            .iter()
            .chain(self.sell_orders.iter())
            .filter(|(_, orders)| !orders.is_empty())
            .map(|(symbol, _)| symbol.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buy_orders
            .values()
            .chain(self.sell_orders.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
