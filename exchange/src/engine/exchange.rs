//! Exchange Facade
//!
//! Owns the market registry, the matching engine and every trader, and
//! routes requests by trader name. All calls take `&mut self`, so order
//! submission and clearing rounds are serialized by construction.

use crate::engine::account::{Trader, Traders};
use crate::engine::data::OrderBook;
use crate::engine::entry::OrderSide;
use crate::engine::market::Market;
use crate::engine::matchengine::{ClearingReport, MatchEngine};
use crate::error::ExchangeError;
use rust_decimal::Decimal;

#[derive(Debug, Default)]
pub struct Exchange {
    market: Market,
    engine: MatchEngine,
    traders: Traders,
}

impl Exchange {
    pub fn new(market: Market) -> Self {
        Self {
            market,
            engine: MatchEngine::new(),
            traders: Traders::new(),
        }
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn market_mut(&mut self) -> &mut Market {
        &mut self.market
    }

    pub fn book(&self) -> &OrderBook {
        self.engine.book()
    }

    pub fn traders(&self) -> &Traders {
        &self.traders
    }

    pub fn trader(&self, name: &str) -> Option<&Trader> {
        self.traders.get(name)
    }

    /// Opens an account for `name` with `cash`.
    pub fn add_trader(&mut self, name: &str, cash: Decimal) -> Result<(), ExchangeError> {
        self.traders
            .insert(Trader::new(name, cash))
            .map_err(|t| ExchangeError::TraderExists(t.name().to_string()))
    }

    pub fn place_limit_order(
        &mut self,
        trader: &str,
        symbol: &str,
        size: u64,
        price: Decimal,
        side: OrderSide,
    ) -> Result<String, ExchangeError> {
        let account = Self::account(&mut self.traders, trader)?;
        Ok(account.place_limit_order(
            self.engine.book_mut(),
            &self.market,
            symbol,
            size,
            price,
            side,
        )?)
    }

    pub fn place_market_order(
        &mut self,
        trader: &str,
        symbol: &str,
        size: u64,
        side: OrderSide,
    ) -> Result<String, ExchangeError> {
        let account = Self::account(&mut self.traders, trader)?;
        Ok(account.place_market_order(self.engine.book_mut(), &self.market, symbol, size, side)?)
    }

    pub fn buy_direct(
        &mut self,
        trader: &str,
        symbol: &str,
        size: u64,
    ) -> Result<Decimal, ExchangeError> {
        let account = Self::account(&mut self.traders, trader)?;
        Ok(account.buy_direct(&self.market, symbol, size)?)
    }

    /// Clears every listed symbol once.
    pub fn run_round(&mut self) -> Vec<ClearingReport> {
        self.engine.run_round(&mut self.market, &mut self.traders)
    }

    pub fn round(&self) -> u64 {
        self.engine.round()
    }

    fn account<'a>(traders: &'a mut Traders, name: &str) -> Result<&'a mut Trader, ExchangeError> {
        traders
            .get_mut(name)
            .ok_or_else(|| ExchangeError::UnknownTrader(name.to_string()))
    }
}
