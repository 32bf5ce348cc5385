//! Candle and interval types for the Bybit market data layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by the market data layer
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bybit API error: {code} - {message}")]
    Api { code: i32, message: String },

    #[error("unknown interval: {0}")]
    UnknownInterval(String),

    #[error("response contained no candles")]
    NoData,
}

/// Candle interval (timeframe) supported by the Bybit kline endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    H12,
    D1,
    W1,
}

impl Interval {
    /// Parse a human-readable interval ("1h", "15m", "1d", ...)
    pub fn parse(s: &str) -> Result<Self, MarketError> {
        match s.to_lowercase().as_str() {
            "1" | "1m" => Ok(Interval::M1),
            "5" | "5m" => Ok(Interval::M5),
            "15" | "15m" => Ok(Interval::M15),
            "30" | "30m" => Ok(Interval::M30),
            "60" | "1h" => Ok(Interval::H1),
            "240" | "4h" => Ok(Interval::H4),
            "720" | "12h" => Ok(Interval::H12),
            "d" | "1d" => Ok(Interval::D1),
            "w" | "1w" => Ok(Interval::W1),
            _ => Err(MarketError::UnknownInterval(s.to_string())),
        }
    }

    /// Interval value in the form the v5 kline API expects
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1",
            Interval::M5 => "5",
            Interval::M15 => "15",
            Interval::M30 => "30",
            Interval::H1 => "60",
            Interval::H4 => "240",
            Interval::H12 => "720",
            Interval::D1 => "D",
            Interval::W1 => "W",
        }
    }

    /// Interval duration in milliseconds
    pub fn duration_ms(&self) -> i64 {
        match self {
            Interval::M1 => 60_000,
            Interval::M5 => 300_000,
            Interval::M15 => 900_000,
            Interval::M30 => 1_800_000,
            Interval::H1 => 3_600_000,
            Interval::H4 => 14_400_000,
            Interval::H12 => 43_200_000,
            Interval::D1 => 86_400_000,
            Interval::W1 => 604_800_000,
        }
    }
}

/// One OHLCV sample for a fixed time interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, Unix timestamp in milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded volume in the base currency
    pub volume: f64,
    /// Traded volume in the quote currency (USDT)
    pub turnover: f64,
}

impl Candle {
    pub fn new(
        timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        turnover: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            turnover,
        }
    }

    /// Open time as a UTC datetime
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Full candle range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Close-over-open change in percent; zero for a zero open
    pub fn change_pct(&self) -> f64 {
        if self.open == 0.0 {
            0.0
        } else {
            (self.close - self.open) / self.open * 100.0
        }
    }
}

/// Envelope of the v5 kline endpoint
#[derive(Debug, Deserialize)]
pub struct KlineResponse {
    #[serde(rename = "retCode")]
    pub ret_code: i32,
    #[serde(rename = "retMsg")]
    pub ret_msg: String,
    pub result: KlineResult,
}

#[derive(Debug, Deserialize)]
pub struct KlineResult {
    pub symbol: String,
    pub category: String,
    /// Rows of [start, open, high, low, close, volume, turnover] strings
    pub list: Vec<Vec<String>>,
}
