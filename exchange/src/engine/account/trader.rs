//! Trader Accounts
//!
//! A trader validates its own orders before handing them to the book and
//! settles fills the book reports back.

use crate::engine::account::SettlementHandler;
use crate::engine::data::OrderBook;
use crate::engine::entry::{Order, OrderSide};
use crate::engine::market::MarketRegistry;
use crate::error::{AdmissionError, SettlementError};
use crate::metrics;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trader {
    name: String,
    cash: Decimal,
    /// symbol -> shares held
    positions: BTreeMap<String, u64>,
    /// symbol -> the one outstanding order for it
    placed: BTreeMap<String, Order>,
}

impl Trader {
    pub fn new(name: impl Into<String>, cash: Decimal) -> Self {
        Self {
            name: name.into(),
            cash,
            positions: BTreeMap::new(),
            placed: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    /// Shares held in `symbol`, zero when there is no position.
    pub fn position(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).copied().unwrap_or(0)
    }

    pub fn positions(&self) -> &BTreeMap<String, u64> {
        &self.positions
    }

    pub fn placed_order(&self, symbol: &str) -> Option<&Order> {
        self.placed.get(symbol)
    }

    pub fn placed_orders(&self) -> impl Iterator<Item = &Order> {
        self.placed.values()
    }

    /// Validates a limit order and submits it to `book`. Returns the order id.
    pub fn place_limit_order(
        &mut self,
        book: &mut OrderBook,
        market: &dyn MarketRegistry,
        symbol: &str,
        size: u64,
        price: Decimal,
        side: OrderSide,
    ) -> Result<String, AdmissionError> {
        if price.is_sign_negative() {
            return Err(self.invalid(symbol, format!("negative limit price {}", price)));
        }
        let order = Order::limit(symbol, self.name.as_str(), side, size, price);
        self.admit(book, market, order)
    }

    /// Validates a market order and submits it to `book`. Buy-side funds are
    /// checked against the symbol's current reference price.
    pub fn place_market_order(
        &mut self,
        book: &mut OrderBook,
        market: &dyn MarketRegistry,
        symbol: &str,
        size: u64,
        side: OrderSide,
    ) -> Result<String, AdmissionError> {
        let order = Order::market(symbol, self.name.as_str(), side, size);
        self.admit(book, market, order)
    }

    /// Buys straight from the registry at its reference price, bypassing the book.
    /// Returns the amount paid.
    pub fn buy_direct(
        &mut self,
        market: &dyn MarketRegistry,
        symbol: &str,
        size: u64,
    ) -> Result<Decimal, AdmissionError> {
        if size == 0 {
            return Err(self.invalid(symbol, "size must be positive".to_string()));
        }
        let price = self.reference_price(market, symbol)?;
        let credited = self.check_position_room(symbol, size)?;
        let cost = self.check_funds(symbol, size, price)?;

        self.cash -= cost;
        self.positions.insert(symbol.to_string(), credited);
        log::info!(
            "{} bought {} {} direct at {} (cash {})",
            self.name,
            size,
            symbol,
            price,
            self.cash
        );
        Ok(cost)
    }

    fn admit(
        &mut self,
        book: &mut OrderBook,
        market: &dyn MarketRegistry,
        order: Order,
    ) -> Result<String, AdmissionError> {
        let checked = self.check_admission(market, &order);
        if let Err(e) = &checked {
            log::warn!("rejected order: {}", e);
            metrics::ORDERS_REJECTED
                .with_label_values(&[e.reason()])
                .inc();
        }
        checked?;

        log::debug!(
            "{} placed {} {:?} {} {} @ {:?} ({})",
            self.name,
            order.side.as_str(),
            order.order_type,
            order.size,
            order.symbol,
            order.limit_price(),
            order.id
        );
        metrics::ORDERS_ADMITTED
            .with_label_values(&[order.side.as_str()])
            .inc();
        let id = order.id.clone();
        self.placed.insert(order.symbol.clone(), order.clone());
        book.submit(order);
        Ok(id)
    }

    fn check_admission(
        &self,
        market: &dyn MarketRegistry,
        order: &Order,
    ) -> Result<(), AdmissionError> {
        let symbol = order.symbol.as_str();
        if order.size == 0 {
            return Err(self.invalid(symbol, "size must be positive".to_string()));
        }
        let reference = self.reference_price(market, symbol)?;

        if self.placed.contains_key(symbol) {
            return Err(AdmissionError::DuplicateOrder {
                trader: self.name.clone(),
                symbol: symbol.to_string(),
            });
        }

        match order.side {
            OrderSide::Sell => {
                let held = self
                    .positions
                    .get(symbol)
                    .copied()
                    .ok_or_else(|| AdmissionError::NotOwned {
                        trader: self.name.clone(),
                        symbol: symbol.to_string(),
                    })?;
                if held < order.size {
                    return Err(AdmissionError::InsufficientShares {
                        trader: self.name.clone(),
                        symbol: symbol.to_string(),
                        held,
                        requested: order.size,
                    });
                }
            }
            OrderSide::Buy => {
                let price = order.limit_price().unwrap_or(reference);
                self.check_position_room(symbol, order.size)?;
                self.check_funds(symbol, order.size, price)?;
            }
        }
        Ok(())
    }

    fn reference_price(
        &self,
        market: &dyn MarketRegistry,
        symbol: &str,
    ) -> Result<Decimal, AdmissionError> {
        market
            .reference_price(symbol)
            .ok_or_else(|| AdmissionError::UnknownSymbol {
                trader: self.name.clone(),
                symbol: symbol.to_string(),
            })
    }

    /// Returns the position after buying `size` more shares.
    fn check_position_room(&self, symbol: &str, size: u64) -> Result<u64, AdmissionError> {
        self.position(symbol).checked_add(size).ok_or_else(|| {
            self.invalid(symbol, format!("position cannot grow by {} shares", size))
        })
    }

    /// An order whose cost leaves `Decimal`'s range is unaffordable.
    fn check_funds(&self, symbol: &str, size: u64, price: Decimal) -> Result<Decimal, AdmissionError> {
        match price.checked_mul(Decimal::from(size)) {
            Some(required) if required <= self.cash => Ok(required),
            required => Err(AdmissionError::InsufficientFunds {
                trader: self.name.clone(),
                symbol: symbol.to_string(),
                size,
                price,
                required: required.unwrap_or(Decimal::MAX),
                available: self.cash,
            }),
        }
    }

    fn invalid(&self, symbol: &str, reason: String) -> AdmissionError {
        AdmissionError::InvalidOrder {
            trader: self.name.clone(),
            symbol: symbol.to_string(),
            reason,
        }
    }
}

impl SettlementHandler for Trader {
    /// Applies a whole-order fill at `price`.
    ///
    /// Only the trader's outstanding order for the symbol is accepted, so a
    /// repeated notification for an already settled order fails with
    /// `UnknownOrder` and changes nothing.
    fn on_filled(&mut self, order: &Order, price: Decimal) -> Result<(), SettlementError> {
        let symbol = order.symbol.as_str();
        if self.placed.get(symbol).map(|o| o.id.as_str()) != Some(order.id.as_str()) {
            return Err(SettlementError::UnknownOrder {
                trader: self.name.clone(),
                symbol: symbol.to_string(),
                order_id: order.id.clone(),
            });
        }
        self.placed.remove(symbol);

        let overflow = || SettlementError::AmountOverflow {
            trader: self.name.clone(),
            symbol: symbol.to_string(),
            order_id: order.id.clone(),
            price,
        };
        let amount = order.notional(price).ok_or_else(overflow)?;
        match order.side {
            OrderSide::Buy => {
                self.cash = self.cash.checked_sub(amount).ok_or_else(overflow)?;
                let held = self.positions.entry(symbol.to_string()).or_insert(0);
                *held = held.saturating_add(order.size);
            }
            OrderSide::Sell => {
                let Some(held) = self.positions.get_mut(symbol) else {
                    return Err(SettlementError::NoPosition {
                        trader: self.name.clone(),
                        symbol: symbol.to_string(),
                        size: order.size,
                    });
                };
                self.cash = self.cash.checked_add(amount).ok_or_else(overflow)?;
                if *held <= order.size {
                    self.positions.remove(symbol);
                } else {
                    *held -= order.size;
                }
            }
        }
        log::debug!(
            "{} settled {} {} {} at {} (cash {})",
            self.name,
            order.side.as_str(),
            order.size,
            symbol,
            price,
            self.cash
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::market::Market;
    use rust_decimal_macros::dec;

    fn market() -> Market {
        let mut market = Market::new();
        market.add_symbol("X", dec!(5)).unwrap();
        market.add_symbol("Y", dec!(50)).unwrap();
        market
    }

    fn holder(market: &Market, shares: u64) -> Trader {
        let mut trader = Trader::new("bob", dec!(1000));
        trader.buy_direct(market, "X", shares).unwrap();
        trader
    }

    #[test]
    fn limit_buy_is_recorded_and_submitted() {
        let market = market();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(100));

        let id = alice
            .place_limit_order(&mut book, &market, "X", 10, dec!(5), OrderSide::Buy)
            .unwrap();

        assert_eq!(alice.placed_order("X").map(|o| o.id.clone()), Some(id.clone()));
        assert_eq!(book.buy_orders("X").len(), 1);
        assert_eq!(book.buy_orders("X")[0].trader, "alice");
        // cash is not reserved at admission
        assert_eq!(alice.cash(), dec!(100));
    }

    #[test]
    fn second_order_for_symbol_is_a_duplicate_on_either_side() {
        let market = market();
        let mut book = OrderBook::new();
        let mut bob = holder(&market, 10);

        bob.place_limit_order(&mut book, &market, "X", 5, dec!(6), OrderSide::Sell)
            .unwrap();
        let err = bob
            .place_limit_order(&mut book, &market, "X", 1, dec!(1), OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::DuplicateOrder { .. }));
        let err = bob
            .place_market_order(&mut book, &market, "X", 1, OrderSide::Sell)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::DuplicateOrder { .. }));
        assert_eq!(book.len(), 1);

        // a different symbol is fine
        bob.place_limit_order(&mut book, &market, "Y", 1, dec!(50), OrderSide::Buy)
            .unwrap();
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn selling_requires_a_large_enough_position() {
        let market = market();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(100));

        let err = alice
            .place_limit_order(&mut book, &market, "X", 1, dec!(5), OrderSide::Sell)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::NotOwned { .. }));

        let mut bob = holder(&market, 10);
        let err = bob
            .place_market_order(&mut book, &market, "X", 11, OrderSide::Sell)
            .unwrap_err();
        assert_eq!(
            err,
            AdmissionError::InsufficientShares {
                trader: "bob".to_string(),
                symbol: "X".to_string(),
                held: 10,
                requested: 11,
            }
        );
        assert!(book.is_empty());
        assert!(bob.placed_order("X").is_none());

        bob.place_market_order(&mut book, &market, "X", 10, OrderSide::Sell)
            .unwrap();
    }

    #[test]
    fn buying_requires_funds() {
        let market = market();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(49.99));

        let err = alice
            .place_limit_order(&mut book, &market, "X", 10, dec!(5), OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::InsufficientFunds { required, .. } if required == dec!(50)
        ));

        // market buys are checked against the reference price (50 per share)
        let err = alice
            .place_market_order(&mut book, &market, "Y", 1, OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InsufficientFunds { .. }));

        alice
            .place_limit_order(&mut book, &market, "X", 9, dec!(5), OrderSide::Buy)
            .unwrap();
    }

    #[test]
    fn invalid_and_unlisted_orders_are_refused() {
        let market = market();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(100));

        let err = alice
            .place_limit_order(&mut book, &market, "X", 0, dec!(5), OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidOrder { .. }));
        let err = alice
            .place_limit_order(&mut book, &market, "X", 1, dec!(-5), OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidOrder { .. }));
        let err = alice
            .place_limit_order(&mut book, &market, "NOPE", 1, dec!(5), OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::UnknownSymbol { .. }));
        assert!(book.is_empty());
    }

    #[test]
    fn buy_direct_debits_cash_and_credits_position() {
        let market = market();
        let mut alice = Trader::new("alice", dec!(100));

        assert_eq!(alice.buy_direct(&market, "X", 4).unwrap(), dec!(20));
        alice.buy_direct(&market, "X", 6).unwrap();
        assert_eq!(alice.cash(), dec!(50));
        assert_eq!(alice.position("X"), 10);
        assert_eq!(alice.positions().len(), 1);

        let err = alice.buy_direct(&market, "Y", 2).unwrap_err();
        assert!(matches!(err, AdmissionError::InsufficientFunds { .. }));
        assert_eq!(alice.cash(), dec!(50));
    }

    #[test]
    fn buy_fill_moves_cash_into_shares() {
        let market = market();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(100));
        alice.buy_direct(&market, "X", 2).unwrap();
        alice
            .place_limit_order(&mut book, &market, "X", 10, dec!(5), OrderSide::Buy)
            .unwrap();
        let order = book.buy_orders("X")[0].clone();

        alice.on_filled(&order, dec!(4)).unwrap();

        assert_eq!(alice.cash(), dec!(50));
        assert_eq!(alice.position("X"), 12);
        assert!(alice.placed_order("X").is_none());
    }

    #[test]
    fn sell_fill_moves_shares_into_cash() {
        let market = market();
        let mut book = OrderBook::new();
        let mut bob = holder(&market, 10);
        bob.place_limit_order(&mut book, &market, "X", 4, dec!(6), OrderSide::Sell)
            .unwrap();
        let order = book.sell_orders("X")[0].clone();

        bob.on_filled(&order, dec!(7)).unwrap();

        assert_eq!(bob.cash(), dec!(950) + dec!(28));
        assert_eq!(bob.position("X"), 6);
        assert!(bob.placed_order("X").is_none());
    }

    #[test]
    fn selling_everything_closes_the_position() {
        let market = market();
        let mut book = OrderBook::new();
        let mut bob = holder(&market, 10);
        bob.place_market_order(&mut book, &market, "X", 10, OrderSide::Sell)
            .unwrap();
        let order = book.sell_orders("X")[0].clone();

        bob.on_filled(&order, dec!(4)).unwrap();

        assert!(!bob.positions().contains_key("X"));
        assert_eq!(bob.position("X"), 0);
    }

    #[test]
    fn repeated_fill_is_refused() {
        let market = market();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(100));
        alice
            .place_limit_order(&mut book, &market, "X", 10, dec!(5), OrderSide::Buy)
            .unwrap();
        let order = book.buy_orders("X")[0].clone();

        alice.on_filled(&order, dec!(5)).unwrap();
        let err = alice.on_filled(&order, dec!(5)).unwrap_err();

        assert!(matches!(err, SettlementError::UnknownOrder { .. }));
        assert_eq!(alice.cash(), dec!(50));
        assert_eq!(alice.position("X"), 10);
    }

    #[test]
    fn sell_fill_without_position_clears_the_order() {
        let mut alice = Trader::new("alice", dec!(100));
        let order = Order::limit("X", "alice", OrderSide::Sell, 3, dec!(5));
        alice.placed.insert("X".to_string(), order.clone());

        let err = alice.on_filled(&order, dec!(5)).unwrap_err();

        assert!(matches!(err, SettlementError::NoPosition { size: 3, .. }));
        assert_eq!(alice.cash(), dec!(100));
        assert!(alice.placed_order("X").is_none());
    }

    #[test]
    fn unrepresentable_cost_is_insufficient_funds() {
        let mut market = market();
        market.add_symbol("BIG", dec!(10000000000)).unwrap();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(100));

        let err = alice
            .place_limit_order(&mut book, &market, "X", u64::MAX, dec!(10000000000), OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::InsufficientFunds { size: u64::MAX, required, .. } if required == Decimal::MAX
        ));
        let err = alice
            .place_market_order(&mut book, &market, "BIG", u64::MAX, OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InsufficientFunds { .. }));
        let err = alice.buy_direct(&market, "BIG", u64::MAX).unwrap_err();
        assert!(matches!(err, AdmissionError::InsufficientFunds { .. }));

        assert!(book.is_empty());
        assert!(alice.placed_order("X").is_none());
        assert_eq!(alice.cash(), dec!(100));
    }

    #[test]
    fn position_cannot_grow_past_u64_max() {
        let mut market = market();
        market.add_symbol("FREE", dec!(0)).unwrap();
        let mut book = OrderBook::new();
        let mut alice = Trader::new("alice", dec!(0));

        alice.buy_direct(&market, "FREE", u64::MAX).unwrap();
        let err = alice.buy_direct(&market, "FREE", 1).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidOrder { .. }));
        let err = alice
            .place_limit_order(&mut book, &market, "FREE", 1, dec!(0), OrderSide::Buy)
            .unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidOrder { .. }));
        assert_eq!(alice.position("FREE"), u64::MAX);
        assert!(book.is_empty());

        // a fill that still arrives saturates the position
        let order = Order::limit("FREE", "alice", OrderSide::Buy, 5, dec!(0));
        alice.placed.insert("FREE".to_string(), order.clone());
        alice.on_filled(&order, dec!(0)).unwrap();
        assert_eq!(alice.position("FREE"), u64::MAX);
    }

    #[test]
    fn fill_overflowing_cash_is_refused() {
        let mut market = market();
        market.add_symbol("FREE", dec!(0)).unwrap();
        let mut alice = Trader::new("alice", Decimal::MAX);
        alice.buy_direct(&market, "FREE", 2).unwrap();
        let order = Order::limit("FREE", "alice", OrderSide::Sell, 2, dec!(1));
        alice.placed.insert("FREE".to_string(), order.clone());

        let err = alice.on_filled(&order, Decimal::MAX).unwrap_err();

        assert!(matches!(err, SettlementError::AmountOverflow { .. }));
        assert_eq!(alice.cash(), Decimal::MAX);
        assert_eq!(alice.position("FREE"), 2);
        assert!(alice.placed_order("FREE").is_none());
    }
}
