use log::warn;
use once_cell::sync::OnceCell;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_derive::Deserialize;
use std::sync::Mutex;

static INSTANCE: OnceCell<Mutex<RuntimeConfig>> = OnceCell::new();

pub fn instance() -> &'static Mutex<RuntimeConfig> {
    INSTANCE.get_or_init(|| Mutex::new(RuntimeConfig::new()))
}

/// Snapshot of the process-wide configuration last loaded by `from_toml`.
pub fn current() -> RuntimeConfig {
    match instance().lock() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SymbolConfig {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HoldingConfig {
    pub symbol: String,
    pub size: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TraderConfig {
    pub name: String,
    pub cash: Decimal,
    /// Shares bought from the registry before the first round
    #[serde(default)]
    pub buy_direct: Vec<HoldingConfig>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OrderFlowConfig {
    /// Chance that a trader submits an order in a given round
    pub order_probability: f64,
    /// Chance that a submitted order is a market order
    pub market_probability: f64,
    pub max_size: u64,
    /// Limit prices are drawn within +/- this fraction of the reference price
    pub price_spread: Decimal,
    pub seed: u64,
}

impl Default for OrderFlowConfig {
    fn default() -> Self {
        OrderFlowConfig {
            order_probability: 0.5,
            market_probability: 0.1,
            max_size: 100,
            price_spread: dec!(0.05),
            seed: 7,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    pub metrics_addr: String,
    pub round_interval_ms: u64,
    /// Stop after this many rounds; 0 runs until interrupted
    pub max_rounds: u64,
    pub symbols: Vec<SymbolConfig>,
    pub traders: Vec<TraderConfig>,
    pub order_flow: OrderFlowConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        RuntimeConfig {
            metrics_addr: "0.0.0.0:4010".to_string(),
            round_interval_ms: 1000,
            max_rounds: 0,
            symbols: Vec::new(),
            traders: Vec::new(),
            order_flow: OrderFlowConfig::default(),
        }
    }

    /// Loads the configuration at `path` and makes it the process-wide
    /// instance. Falls back to defaults when the file cannot be read or parsed.
    pub fn from_toml(path: &str) -> Self {
        let config = match Self::read(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    "Something went wrong reading the runtime config file, {:?}",
                    e
                );
                RuntimeConfig::new()
            }
        };
        match instance().lock() {
            Ok(mut current) => *current = config.clone(),
            Err(poisoned) => *poisoned.into_inner() = config.clone(),
        }
        config
    }

    fn read(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // from_toml replaces the shared instance
    static SERIAL: Mutex<()> = Mutex::new(());

    #[test]
    fn parses_a_full_config() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
metrics_addr = "127.0.0.1:9000"
round_interval_ms = 250
max_rounds = 3

[[symbols]]
name = "SBUX"
price = 30.5

[[traders]]
name = "alice"
cash = 1000
buy_direct = [{{ symbol = "SBUX", size = 10 }}]

[order_flow]
max_size = 5
seed = 42
"#
        )
        .unwrap();

        let config = RuntimeConfig::from_toml(file.path().to_str().unwrap());

        assert_eq!(config.metrics_addr, "127.0.0.1:9000");
        assert_eq!(config.max_rounds, 3);
        assert_eq!(config.symbols[0].price, dec!(30.5));
        assert_eq!(config.traders[0].cash, dec!(1000));
        assert_eq!(config.traders[0].buy_direct[0].size, 10);
        assert_eq!(config.order_flow.max_size, 5);
        assert_eq!(config.order_flow.seed, 42);
        assert_eq!(config.order_flow.market_probability, 0.1);
        assert_eq!(current(), config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = RuntimeConfig::from_toml(path.to_str().unwrap());
        assert_eq!(config, RuntimeConfig::new());
        assert_eq!(current(), RuntimeConfig::new());
    }
}
