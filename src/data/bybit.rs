//! Bybit API client for historical kline data.

use super::types::{Candle, Interval, KlineResponse, MarketError};
use log::{debug, info};

/// Base URL of the Bybit v5 REST API
const BYBIT_API_URL: &str = "https://api.bybit.com";

/// Maximum candles per kline request, enforced server-side
const MAX_LIMIT: u32 = 1000;

/// Async client for Bybit market data
#[derive(Debug, Clone)]
pub struct BybitClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for BybitClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BybitClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: BYBIT_API_URL.to_string(),
        }
    }

    /// Client against a custom base URL (testnet, mock server)
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Fetch up to 1000 most recent klines for a symbol, oldest first.
    ///
    /// # Arguments
    ///
    /// * `symbol` - Trading pair, e.g. "BTCUSDT"
    /// * `interval` - Timeframe, e.g. "1h", "4h", "1d"
    /// * `limit` - Number of candles (capped at 1000)
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, MarketError> {
        let interval = Interval::parse(interval)?;
        let url = self.kline_url(symbol, interval, limit.min(MAX_LIMIT), None);

        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let payload: KlineResponse = response.json().await?;
        check_ret_code(&payload)?;

        let mut candles = parse_klines(&payload.result.list)?;
        candles.sort_by_key(|c| c.timestamp);

        info!("fetched {} candles for {} ({:?})", candles.len(), symbol, interval);
        Ok(candles)
    }

    /// Fetch more than 1000 klines by paginating backwards in time.
    ///
    /// Issues one request per 1000-candle page and returns the combined
    /// series sorted oldest first.
    pub async fn get_klines_bulk(
        &self,
        symbol: &str,
        interval: &str,
        total: u32,
    ) -> Result<Vec<Candle>, MarketError> {
        let interval = Interval::parse(interval)?;
        let mut all = Vec::with_capacity(total as usize);
        let mut end_time: Option<i64> = None;

        let pages = (total + MAX_LIMIT - 1) / MAX_LIMIT;
        for page in 0..pages {
            let remaining = total - page * MAX_LIMIT;
            let url = self.kline_url(symbol, interval, remaining.min(MAX_LIMIT), end_time);

            debug!("page {}/{}: GET {}", page + 1, pages, url);
            let response = self.client.get(&url).send().await?;
            let payload: KlineResponse = response.json().await?;
            check_ret_code(&payload)?;

            let candles = parse_klines(&payload.result.list)?;
            if candles.is_empty() {
                break;
            }

            // Bybit returns newest first; continue before the oldest row
            if let Some(oldest) = candles.iter().map(|c| c.timestamp).min() {
                end_time = Some(oldest - 1);
            }
            all.extend(candles);

            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }

        all.sort_by_key(|c| c.timestamp);
        all.dedup_by_key(|c| c.timestamp);

        info!("fetched {} candles total for {} ({:?})", all.len(), symbol, interval);
        Ok(all)
    }

    fn kline_url(&self, symbol: &str, interval: Interval, limit: u32, end: Option<i64>) -> String {
        let mut url = format!(
            "{}/v5/market/kline?category=spot&symbol={}&interval={}&limit={}",
            self.base_url,
            symbol.to_uppercase(),
            interval.as_api_str(),
            limit
        );
        if let Some(end) = end {
            url.push_str(&format!("&end={}", end));
        }
        url
    }
}

/// Blocking client for simple scripts and tools
pub struct BybitClientSync {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Default for BybitClientSync {
    fn default() -> Self {
        Self::new()
    }
}

impl BybitClientSync {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: BYBIT_API_URL.to_string(),
        }
    }

    /// Blocking counterpart of [`BybitClient::get_klines`]
    pub fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, MarketError> {
        let interval = Interval::parse(interval)?;
        let url = format!(
            "{}/v5/market/kline?category=spot&symbol={}&interval={}&limit={}",
            self.base_url,
            symbol.to_uppercase(),
            interval.as_api_str(),
            limit.min(MAX_LIMIT)
        );

        let response = self.client.get(&url).send()?;
        let payload: KlineResponse = response.json()?;
        check_ret_code(&payload)?;

        let mut candles = parse_klines(&payload.result.list)?;
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

fn check_ret_code(payload: &KlineResponse) -> Result<(), MarketError> {
    if payload.ret_code != 0 {
        return Err(MarketError::Api {
            code: payload.ret_code,
            message: payload.ret_msg.clone(),
        });
    }
    Ok(())
}

/// Parse raw kline rows ([start, open, high, low, close, volume, turnover])
fn parse_klines(raw: &[Vec<String>]) -> Result<Vec<Candle>, MarketError> {
    let candles: Vec<Candle> = raw
        .iter()
        .filter_map(|row| {
            if row.len() >= 7 {
                Some(Candle::new(
                    row[0].parse().unwrap_or(0),
                    row[1].parse().unwrap_or(0.0),
                    row[2].parse().unwrap_or(0.0),
                    row[3].parse().unwrap_or(0.0),
                    row[4].parse().unwrap_or(0.0),
                    row[5].parse().unwrap_or(0.0),
                    row[6].parse().unwrap_or(0.0),
                ))
            } else {
                None
            }
        })
        .collect();

    if candles.is_empty() && !raw.is_empty() {
        return Err(MarketError::NoData);
    }
    Ok(candles)
}
