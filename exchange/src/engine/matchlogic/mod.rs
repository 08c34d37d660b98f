//! Match Logic Module
//!
//! Call-auction clearing: builds the cumulative supply and demand curves for
//! a symbol and picks the single price at which the round executes.

pub mod curve;
pub mod matcher;

pub use curve::DepthCurve;
pub use matcher::{discover_price, split_executable, PriceDiscovery, PriceKind};
