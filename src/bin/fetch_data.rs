//! Download historical klines from Bybit into a CSV file.
//!
//! Usage: fetch_data [SYMBOL] [INTERVAL] [COUNT] [OUT_PATH]

use anyhow::Result;
use log::info;
use rnn_trader::data::BybitClient;
use rnn_trader::utils::{save_candles_csv, AppConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    let args: Vec<String> = env::args().collect();

    let symbol = args.get(1).cloned().unwrap_or(config.data.symbol);
    let interval = args.get(2).cloned().unwrap_or(config.data.interval);
    let count: u32 = match args.get(3) {
        Some(raw) => raw.parse()?,
        None => config.data.limit,
    };
    let out_path = args
        .get(4)
        .cloned()
        .unwrap_or_else(|| format!("data/{}_{}.csv", symbol.to_lowercase(), interval));

    info!("fetching {} {} candles for {}", count, interval, symbol);
    let client = BybitClient::new();
    let candles = if count <= 1000 {
        client.get_klines(&symbol, &interval, count).await?
    } else {
        client.get_klines_bulk(&symbol, &interval, count).await?
    };

    if let Some(last) = candles.last() {
        println!(
            "fetched {} candles, last close {:.2} at {}",
            candles.len(),
            last.close,
            last.datetime()
        );
    }

    if let Some(parent) = std::path::Path::new(&out_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    save_candles_csv(&candles, &out_path)?;
    println!("saved to {}", out_path);

    Ok(())
}
