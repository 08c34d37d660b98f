use crate::config::{self, RuntimeConfig};
use crate::engine::exchange::Exchange;
use crate::metrics;
use crate::simulation::{build_exchange, OrderFlow};

use anyhow::Context;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use std::time::Duration;

/// Simulation host: one exchange, a random order flow and a clearing timer.
pub struct Server {
    config: RuntimeConfig,
    exchange: Exchange,
    flow: OrderFlow,
}

impl Server {
    /// Builds the host from the configuration loaded by `RuntimeConfig::from_toml`.
    pub fn builder() -> anyhow::Result<Self> {
        let config = config::current();
        let exchange = build_exchange(&config).context("failed to set up exchange")?;
        let flow = OrderFlow::new(config.order_flow.clone());
        Ok(Server {
            config,
            exchange,
            flow,
        })
    }

    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.start_metrics_server().await
    }

    /// Submits orders and clears the book once per interval until
    /// `max_rounds` is reached (or forever when it is 0).
    pub async fn run(&mut self) {
        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.round_interval_ms.max(1)));
        loop {
            ticker.tick().await;
            let stats = self.flow.submit_round(&mut self.exchange);
            let reports = self.exchange.run_round();
            log::debug!(
                "round {}: {} orders submitted, {} rejected, {} symbols priced",
                self.exchange.round(),
                stats.submitted,
                stats.rejected,
                reports.len()
            );
            if self.config.max_rounds > 0 && self.exchange.round() >= self.config.max_rounds {
                log::info!("reached {} rounds", self.config.max_rounds);
                break;
            }
        }
    }

    pub fn stop(&mut self) {
        for trader in self.exchange.traders().iter() {
            match serde_json::to_string(trader) {
                Ok(json) => log::info!("final account {}", json),
                Err(e) => log::warn!("failed to serialize trader {}: {}", trader.name(), e),
            }
        }
        log::info!("server stop after {} rounds", self.exchange.round());
    }

    async fn start_metrics_server(&mut self) -> anyhow::Result<()> {
        let addr: SocketAddr = self
            .config
            .metrics_addr
            .parse()
            .with_context(|| format!("invalid metrics_addr {}", self.config.metrics_addr))?;
        let make_svc = make_service_fn(move |_| {
            let registry = metrics::REGISTRY_INSTANCE.clone();
            async move {
                Ok::<_, hyper::Error>(service_fn(move |_: Request<Body>| {
                    let registry = registry.clone();
                    async move {
                        let encoder = TextEncoder::new();
                        let metric_families = registry.gather();
                        let mut buffer = Vec::new();
                        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
                            log::error!("failed to encode metrics: {}", e);
                        }
                        Ok::<_, hyper::Error>(Response::new(Body::from(buffer)))
                    }
                }))
            }
        });
        metrics::init_registry();
        let server = hyper::Server::try_bind(&addr)
            .with_context(|| format!("failed to bind metrics server on {}", addr))?
            .serve(make_svc);
        tokio::spawn(async move {
            if let Err(e) = server.await {
                log::error!("metrics server error: {}", e);
            }
        });
        log::info!("metrics server started on {}", addr);
        Ok(())
    }
}
