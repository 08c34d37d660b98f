//! Metrics collection module for the exchange
//!
//! This module provides counters and histograms for order admission and
//! clearing rounds, exposed through Prometheus.

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Histogram, HistogramOpts, Opts, Registry};
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry instance
    pub static ref REGISTRY_INSTANCE: Registry = Registry::new();

    /// Orders accepted into the book, by side
    pub static ref ORDERS_ADMITTED: CounterVec =
        CounterVec::new(Opts::new("orders_admitted", "orders admitted"), &["side"]).unwrap();

    /// Orders refused at admission, by reason
    pub static ref ORDERS_REJECTED: CounterVec =
        CounterVec::new(Opts::new("orders_rejected", "orders rejected"), &["reason"]).unwrap();

    /// Whole-order executions, by side
    pub static ref FILLS_EXECUTED: CounterVec =
        CounterVec::new(Opts::new("fills_executed", "fills executed"), &["side"]).unwrap();

    /// Fills the owning trader failed to settle
    pub static ref SETTLEMENT_FAILURES: Counter =
        Counter::new("settlement_failures", "settlement failures").unwrap();

    /// Clearing prices published to the registry, by how they were found
    pub static ref PRICES_PUBLISHED: CounterVec =
        CounterVec::new(Opts::new("prices_published", "prices published"), &["kind"]).unwrap();

    /// Time spent in one symbol's clearing pass
    pub static ref CLEARING_HISTOGRAM: Histogram =
        Histogram::with_opts(HistogramOpts::new("clearing_cost", "clearing cost")).unwrap();
}

/// Initializes the metrics registry
///
/// Registers all metric collectors with the global registry
pub fn init_registry() {
    let _ = REGISTRY_INSTANCE.register(Box::new(ORDERS_ADMITTED.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(ORDERS_REJECTED.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(FILLS_EXECUTED.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(SETTLEMENT_FAILURES.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(PRICES_PUBLISHED.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(CLEARING_HISTOGRAM.clone()));
}

/// Runs `handler` and records its duration in the clearing histogram
pub fn record_clearing<F, T>(handler: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = handler();
    CLEARING_HISTOGRAM.observe(start.elapsed().as_secs_f64());
    result
}
