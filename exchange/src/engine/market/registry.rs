//! Market Registry
//!
//! Owns the listed symbols and their reference prices. Clearing passes
//! publish prices here; every change is appended to the market history and
//! forwarded to subscribers.

use crate::engine::entry::Symbol;
use crate::engine::market::{MarketHistory, PriceUpdate};
use crate::error::ListingError;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::sync::mpsc::{self, Receiver, Sender};

/// What the order book and traders need from the registry.
pub trait MarketRegistry {
    /// Current reference price, `None` if the symbol is not listed.
    fn reference_price(&self, symbol: &str) -> Option<Decimal>;

    /// Publishes a new price for `symbol`.
    fn set_price(&mut self, symbol: &str, price: Decimal);

    fn list_symbols(&self) -> BTreeSet<String>;
}

/// In-memory registry with an append-only price history.
#[derive(Debug, Default)]
pub struct Market {
    /// Map of symbol names to their listing
    symbols: HashMap<String, Symbol>,
    history: MarketHistory,
    subscribers: Vec<Sender<PriceUpdate>>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists a new symbol at an opening reference price.
    pub fn add_symbol(&mut self, name: &str, price: Decimal) -> Result<(), ListingError> {
        if self.symbols.contains_key(name) {
            return Err(ListingError::SymbolExists(name.to_string()));
        }
        if price.is_sign_negative() {
            return Err(ListingError::InvalidPrice {
                symbol: name.to_string(),
                price,
            });
        }
        self.symbols
            .insert(name.to_string(), Symbol::new(name, price));
        log::info!("listed {} at {}", name, price);
        Ok(())
    }

    pub fn history(&self) -> &MarketHistory {
        &self.history
    }

    /// Returns a channel that receives every price update published from now on.
    pub fn subscribe(&mut self) -> Receiver<PriceUpdate> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }
}

impl MarketRegistry for Market {
    fn reference_price(&self, symbol: &str) -> Option<Decimal> {
        self.symbols.get(symbol).map(|s| s.price)
    }

    fn set_price(&mut self, symbol: &str, price: Decimal) {
        let Some(listing) = self.symbols.get_mut(symbol) else {
            log::warn!("ignoring price {} for unlisted symbol {}", price, symbol);
            return;
        };
        let previous = listing.reprice(price);
        let update = self.history.record(symbol, previous, price).clone();
        log::debug!("{} repriced {} -> {}", symbol, previous, price);
        self.subscribers.retain(|tx| tx.send(update.clone()).is_ok());
    }

    fn list_symbols(&self) -> BTreeSet<String> {
        self.symbols.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn add_symbol_rejects_duplicates() {
        let mut market = Market::new();
        market.add_symbol("SBUX", dec!(30)).unwrap();
        assert_eq!(
            market.add_symbol("SBUX", dec!(31)),
            Err(ListingError::SymbolExists("SBUX".to_string()))
        );
        assert_eq!(market.reference_price("SBUX"), Some(dec!(30)));
        assert!(market.add_symbol("BAD", dec!(-1)).is_err());
    }

    #[test]
    fn set_price_records_history() {
        let mut market = Market::new();
        market.add_symbol("SBUX", dec!(30)).unwrap();
        market.add_symbol("IBM", dec!(120)).unwrap();
        market.set_price("SBUX", dec!(31.5));
        market.set_price("IBM", dec!(119));
        market.set_price("SBUX", dec!(32));

        assert_eq!(market.reference_price("SBUX"), Some(dec!(32)));
        assert_eq!(market.history().len(), 3);
        let sbux: Vec<_> = market.history().for_symbol("SBUX").collect();
        assert_eq!(sbux.len(), 2);
        assert_eq!(sbux[0].previous, dec!(30));
        assert_eq!(sbux[1].previous, dec!(31.5));
        assert_eq!(market.history().last("IBM").map(|u| u.seq), Some(1));
    }

    #[test]
    fn unlisted_symbols_are_ignored() {
        let mut market = Market::new();
        market.set_price("NOPE", dec!(1));
        assert!(market.history().is_empty());
        assert_eq!(market.reference_price("NOPE"), None);
    }

    #[test]
    fn subscribers_receive_updates() {
        let mut market = Market::new();
        market.add_symbol("SBUX", dec!(30)).unwrap();
        let rx = market.subscribe();
        let dropped = market.subscribe();
        drop(dropped);

        market.set_price("SBUX", dec!(29));
        let update = rx.try_recv().unwrap();
        assert_eq!(update.symbol, "SBUX");
        assert_eq!(update.price, dec!(29));
        assert_eq!(market.subscribers.len(), 1);
    }

    #[test]
    fn list_symbols_is_sorted() {
        let mut market = Market::new();
        market.add_symbol("ZZ", dec!(1)).unwrap();
        market.add_symbol("AA", dec!(1)).unwrap();
        assert_eq!(
            market.list_symbols().into_iter().collect::<Vec<_>>(),
            vec!["AA".to_string(), "ZZ".to_string()]
        );
    }
}
