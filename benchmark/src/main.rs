use clap::Parser;
use exchange::config::{OrderFlowConfig, RuntimeConfig, SymbolConfig, TraderConfig};
use exchange::simulation::{build_exchange, OrderFlow};
use hdrhistogram::Histogram;
use rust_decimal::Decimal;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of traders
    #[arg(short, long, default_value = "1000")]
    traders: usize,

    /// Number of listed symbols
    #[arg(short, long, default_value = "20")]
    symbols: usize,

    /// Number of clearing rounds
    #[arg(short, long, default_value = "500")]
    rounds: u64,

    /// Starting cash per trader
    #[arg(short, long, default_value = "1000000")]
    cash: u64,

    /// RNG seed for the order flow
    #[arg(long, default_value = "7")]
    seed: u64,
}

fn config(args: &Args) -> RuntimeConfig {
    let symbols = (0..args.symbols)
        .map(|i| SymbolConfig {
            name: format!("SYM{:03}", i),
            price: Decimal::from(10 + (i as u64 % 90)),
        })
        .collect::<Vec<_>>();
    // every trader starts with a block of one symbol so there is supply to sell
    let traders = (0..args.traders)
        .map(|i| TraderConfig {
            name: format!("trader{:05}", i),
            cash: Decimal::from(args.cash),
            buy_direct: symbols
                .get(i % symbols.len().max(1))
                .map(|s| exchange::config::HoldingConfig {
                    symbol: s.name.clone(),
                    size: 100,
                })
                .into_iter()
                .collect(),
        })
        .collect();
    RuntimeConfig {
        symbols,
        traders,
        order_flow: OrderFlowConfig {
            order_probability: 0.8,
            seed: args.seed,
            ..OrderFlowConfig::default()
        },
        ..RuntimeConfig::new()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::try_init().unwrap_or_default();
    let args = Args::parse();

    let config = config(&args);
    let mut exchange = build_exchange(&config)?;
    let mut flow = OrderFlow::new(config.order_flow.clone());
    let mut histogram = Histogram::<u64>::new(3)?;
    let (mut submitted, mut rejected, mut fills) = (0u64, 0u64, 0usize);

    println!(
        "Starting benchmark with {} traders, {} symbols, {} rounds",
        args.traders, args.symbols, args.rounds
    );

    let started = Instant::now();
    for _ in 0..args.rounds {
        let stats = flow.submit_round(&mut exchange);
        submitted += stats.submitted;
        rejected += stats.rejected;

        let start = Instant::now();
        let reports = exchange.run_round();
        histogram.record(start.elapsed().as_micros() as u64)?;
        fills += reports.iter().map(|r| r.fills.len()).sum::<usize>();
    }
    let elapsed = started.elapsed();

    println!("\nBenchmark Results:");
    println!("Orders submitted: {}", submitted);
    println!("Orders rejected: {}", rejected);
    println!("Fills: {}", fills);
    println!("Resting orders: {}", exchange.book().len());
    println!("Price updates: {}", exchange.market().history().len());
    println!(
        "Average rounds/s: {:.2}",
        args.rounds as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("\nClearing round latency (microseconds):");
    println!("p50: {}", histogram.value_at_percentile(50.0));
    println!("p90: {}", histogram.value_at_percentile(90.0));
    println!("p95: {}", histogram.value_at_percentile(95.0));
    println!("p99: {}", histogram.value_at_percentile(99.0));
    println!("p99.9: {}", histogram.value_at_percentile(99.9));

    Ok(())
}
