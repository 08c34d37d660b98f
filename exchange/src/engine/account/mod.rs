//! Account Module
//!
//! - `trader`: cash, positions and outstanding orders of one trader
//! - `traders`: directory of traders that dispatches fills by owner

pub mod trader;
pub mod traders;

pub use trader::Trader;
pub use traders::Traders;

use crate::engine::entry::Order;
use crate::error::SettlementError;
use rust_decimal::Decimal;

/// Receives fills from a clearing pass.
///
/// Called at most once per order per match, after the order has already
/// left the book. An error does not put the order back.
pub trait SettlementHandler {
    fn on_filled(&mut self, order: &Order, price: Decimal) -> Result<(), SettlementError>;
}
