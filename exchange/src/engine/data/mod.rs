//! Data Structures Module
//!
//! Storage for outstanding orders. The order book keeps, per symbol, the
//! buy orders and sell orders waiting for the next clearing round.

pub mod orderbook;

pub use orderbook::OrderBook;
