//! Single-venue call-auction exchange.
//!
//! Traders validate and submit orders to a per-symbol order book; each round
//! the matching engine clears every listed symbol at one uniform price,
//! publishes it to the market registry and settles the executed orders with
//! their owners.

pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod server;
pub mod simulation;

pub use engine::account::{SettlementHandler, Trader, Traders};
pub use engine::data::OrderBook;
pub use engine::entry::{Fill, Order, OrderSide, OrderType, Symbol};
pub use engine::exchange::Exchange;
pub use engine::market::{Market, MarketHistory, MarketRegistry, PriceUpdate};
pub use engine::matchengine::{ClearingReport, MatchEngine};
pub use engine::matchlogic::{PriceDiscovery, PriceKind};
pub use error::{AdmissionError, ExchangeError, ListingError, SettlementError};
