//! CSV persistence for candles and trade logs.

use crate::data::Candle;
use crate::trading::TradeRecord;
use anyhow::{Context, Result};
use std::path::Path;

/// Write candles to CSV with a header row.
pub fn save_candles_csv<P: AsRef<Path>>(candles: &[Candle], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(&path).context("failed to create candle CSV")?;

    writer.write_record(["timestamp", "open", "high", "low", "close", "volume", "turnover"])?;
    for c in candles {
        writer.write_record(&[
            c.timestamp.to_string(),
            c.open.to_string(),
            c.high.to_string(),
            c.low.to_string(),
            c.close.to_string(),
            c.volume.to_string(),
            c.turnover.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read candles from a CSV written by [`save_candles_csv`].
pub fn load_candles_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>> {
    let mut reader = csv::Reader::from_path(&path).context("failed to open candle CSV")?;
    let mut candles = Vec::new();

    for record in reader.records() {
        let record = record?;
        candles.push(Candle::new(
            record[0].parse()?,
            record[1].parse()?,
            record[2].parse()?,
            record[3].parse()?,
            record[4].parse()?,
            record[5].parse()?,
            record[6].parse()?,
        ));
    }

    Ok(candles)
}

/// Export a realized trade log to CSV.
pub fn export_trades_csv<P: AsRef<Path>>(trades: &[TradeRecord], path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(&path).context("failed to create trade CSV")?;

    writer.write_record([
        "direction",
        "entry_index",
        "exit_index",
        "entry_price",
        "exit_price",
        "pnl",
    ])?;
    for t in trades {
        writer.write_record(&[
            format!("{:?}", t.direction),
            t.entry_index.to_string(),
            t.exit_index.to_string(),
            t.entry_price.to_string(),
            t.exit_price.to_string(),
            t.pnl.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_series, SyntheticConfig};
    use crate::trading::Direction;

    #[test]
    fn test_candle_round_trip() {
        let candles = generate_series(20, 9, &SyntheticConfig::default());
        let path = std::env::temp_dir().join("rnn_trader_candles_test.csv");

        save_candles_csv(&candles, &path).unwrap();
        let restored = load_candles_csv(&path).unwrap();

        assert_eq!(candles.len(), restored.len());
        for (a, b) in candles.iter().zip(restored.iter()) {
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.close, b.close);
        }
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_trade_export() {
        let trades = vec![TradeRecord {
            direction: Direction::Long,
            entry_price: 100.0,
            exit_price: 105.0,
            entry_index: 3,
            exit_index: 7,
            pnl: 7.5,
        }];
        let path = std::env::temp_dir().join("rnn_trader_trades_test.csv");

        export_trades_csv(&trades, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Long"));
        assert!(content.contains("7.5"));
        std::fs::remove_file(&path).ok();
    }
}
