//! # RNN Trader
//!
//! Recurrent neural networks (LSTM/GRU) for cryptocurrency price
//! forecasting, three-way signal classification and single-position
//! backtesting on Bybit market data.
//!
//! ## Modules
//!
//! - `data` - Bybit API client, candle types, synthetic series
//! - `preprocessing` - Features, min-max scaling, labeling, windowing
//! - `model` - LSTM and GRU implementations, predictor trait
//! - `trading` - Actions, positions and the trade simulator
//! - `utils` - Metrics, CSV I/O and application configuration
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rnn_trader::data::BybitClient;
//! use rnn_trader::preprocessing::DataProcessor;
//! use rnn_trader::model::{Lstm, RnnConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BybitClient::new();
//!     let candles = client.get_klines("BTCUSDT", "1h", 1000).await?;
//!
//!     let mut processor = DataProcessor::new(24, 1, 0.0)?;
//!     let (x, y, _labels) = processor.prepare_classification(&candles)?;
//!
//!     let mut model = Lstm::from_config(RnnConfig::new(x.shape()[2], 32, 3));
//!     model.train(&x, &y, 50, 0.001)?;
//!
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod model;
pub mod preprocessing;
pub mod trading;
pub mod utils;

pub use data::{BybitClient, Candle};
pub use model::{Gru, Lstm, Predictor, RnnConfig};
pub use preprocessing::DataProcessor;
pub use trading::{Action, SimulatorConfig, TradeSimulator};
