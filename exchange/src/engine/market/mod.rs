//! Market Module
//!
//! - `registry`: listed symbols, reference prices and the `MarketRegistry` contract
//! - `history`: append-only record of published prices

pub mod history;
pub mod registry;

pub use history::{MarketHistory, PriceUpdate};
pub use registry::{Market, MarketRegistry};
