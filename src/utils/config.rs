//! Application configuration for the command-line tools.

use crate::trading::SimulatorConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration grouping data, training and simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub training: TrainingConfig,
    pub simulation: SimulatorConfig,
}

/// Market data settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Trading pair, e.g. "BTCUSDT"
    pub symbol: String,
    /// Candle interval, e.g. "1h"
    pub interval: String,
    /// Number of candles to fetch
    pub limit: u32,
}

/// Training settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Window length fed to the model
    pub seq_len: usize,
    /// Label horizon in bars
    pub horizon: usize,
    /// Neutral band for the three-way labels
    pub neutral_band: f64,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub batch_size: usize,
    /// Chronological train share
    pub train_ratio: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                symbol: "BTCUSDT".to_string(),
                interval: "1h".to_string(),
                limit: 1000,
            },
            training: TrainingConfig {
                seq_len: 24,
                horizon: 1,
                neutral_band: 0.0,
                hidden_size: 32,
                num_layers: 1,
                epochs: 30,
                learning_rate: 0.001,
                batch_size: 32,
                train_ratio: 0.8,
            },
            simulation: SimulatorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from a JSON file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to a JSON file.
    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Defaults with environment-variable overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(symbol) = std::env::var("TRADING_SYMBOL") {
            config.data.symbol = symbol;
        }
        if let Ok(interval) = std::env::var("TRADING_INTERVAL") {
            config.data.interval = interval;
        }
        if let Ok(balance) = std::env::var("INITIAL_BALANCE") {
            if let Ok(value) = balance.parse() {
                config.simulation.initial_balance = value;
            }
        }

        config
    }
}
