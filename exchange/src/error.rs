//! Error types for order admission, settlement and the exchange facade.

use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons a trader's order (or direct purchase) is refused before it is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("trader {trader} already has an outstanding order for {symbol}")]
    DuplicateOrder { trader: String, symbol: String },

    #[error("trader {trader} holds no position in {symbol}")]
    NotOwned { trader: String, symbol: String },

    #[error("trader {trader} holds {held} shares of {symbol}, cannot sell {requested}")]
    InsufficientShares {
        trader: String,
        symbol: String,
        held: u64,
        requested: u64,
    },

    #[error(
        "trader {trader} cannot afford {size} {symbol} at {price}: required {required}, available {available}"
    )]
    InsufficientFunds {
        trader: String,
        symbol: String,
        size: u64,
        price: Decimal,
        required: Decimal,
        available: Decimal,
    },

    #[error("invalid order from {trader} for {symbol}: {reason}")]
    InvalidOrder {
        trader: String,
        symbol: String,
        reason: String,
    },

    #[error("symbol {symbol} is not listed (trader {trader})")]
    UnknownSymbol { trader: String, symbol: String },
}

impl AdmissionError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::DuplicateOrder { .. } => "duplicate_order",
            AdmissionError::NotOwned { .. } => "not_owned",
            AdmissionError::InsufficientShares { .. } => "insufficient_shares",
            AdmissionError::InsufficientFunds { .. } => "insufficient_funds",
            AdmissionError::InvalidOrder { .. } => "invalid_order",
            AdmissionError::UnknownSymbol { .. } => "unknown_symbol",
        }
    }
}

/// Failures raised while a trader settles a fill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error("no trader named {trader} (order {order_id})")]
    UnknownTrader { trader: String, order_id: String },

    #[error("order {order_id} is not outstanding for trader {trader} on {symbol}")]
    UnknownOrder {
        trader: String,
        symbol: String,
        order_id: String,
    },

    #[error("trader {trader} sold {size} {symbol} without holding a position")]
    NoPosition {
        trader: String,
        symbol: String,
        size: u64,
    },

    #[error("order {order_id} of {trader} on {symbol} overflows the cash balance at {price}")]
    AmountOverflow {
        trader: String,
        symbol: String,
        order_id: String,
        price: Decimal,
    },
}

/// Symbol registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("symbol {0} already exists")]
    SymbolExists(String),

    #[error("invalid reference price {price} for {symbol}")]
    InvalidPrice { symbol: String, price: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("no trader named {0}")]
    UnknownTrader(String),

    #[error("trader {0} already exists")]
    TraderExists(String),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error(transparent)]
    Listing(#[from] ListingError),
}
