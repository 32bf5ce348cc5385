//! Market data: Bybit API client, candle types and synthetic series.

mod bybit;
mod synthetic;
mod types;

pub use bybit::{BybitClient, BybitClientSync};
pub use synthetic::{generate_series, SyntheticConfig};
pub use types::{Candle, Interval, KlineResponse, MarketError};
