//! Match Engine Module
//!
//! This module contains the core components of the call-auction exchange:
//! - `entry`: Orders, listed symbols and fill records
//! - `data`: Order book storage
//! - `matchlogic`: Supply/demand curves and clearing price discovery
//! - `matchengine`: Clearing passes and rounds
//! - `market`: Market registry and price history
//! - `account`: Traders, admission checks and fill settlement
//! - `exchange`: Facade that wires the pieces together

pub mod account;
pub mod data;
pub mod entry;
pub mod exchange;
pub mod market;
pub mod matchengine;
pub mod matchlogic;
