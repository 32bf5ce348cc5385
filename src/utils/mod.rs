//! Metrics, CSV I/O and application configuration.

pub mod config;
pub mod io;
pub mod metrics;

pub use config::AppConfig;
pub use io::{export_trades_csv, load_candles_csv, save_candles_csv};
pub use metrics::{accuracy, max_drawdown, mse, profit_factor, rmse, sharpe_ratio, win_rate};
