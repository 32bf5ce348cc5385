//! Feature extraction from OHLCV candles.

use crate::data::Candle;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configurable extractor turning a candle series into a feature matrix,
/// one row per bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureExtractor {
    /// Raw open/high/low/close columns
    pub use_ohlc: bool,
    /// Traded volume column
    pub use_volume: bool,
    /// High-low range column
    pub use_range: bool,
    /// One-bar close-to-close return column
    pub use_returns: bool,
    /// Simple moving average of the close
    pub use_sma: bool,
    pub sma_period: usize,
    /// Relative strength index of the close
    pub use_rsi: bool,
    pub rsi_period: usize,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            use_ohlc: true,
            use_volume: true,
            use_range: true,
            use_returns: true,
            use_sma: false,
            sma_period: 20,
            use_rsi: false,
            rsi_period: 14,
        }
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor with every available feature enabled
    pub fn all_features() -> Self {
        Self {
            use_sma: true,
            use_rsi: true,
            ..Self::default()
        }
    }

    /// Number of columns the extractor produces
    pub fn feature_count(&self) -> usize {
        let mut count = 0;
        if self.use_ohlc {
            count += 4;
        }
        if self.use_volume {
            count += 1;
        }
        if self.use_range {
            count += 1;
        }
        if self.use_returns {
            count += 1;
        }
        if self.use_sma {
            count += 1;
        }
        if self.use_rsi {
            count += 1;
        }
        count
    }

    /// Column names, in extraction order
    pub fn feature_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.use_ohlc {
            names.extend_from_slice(&["open", "high", "low", "close"]);
        }
        if self.use_volume {
            names.push("volume");
        }
        if self.use_range {
            names.push("range");
        }
        if self.use_returns {
            names.push("returns");
        }
        if self.use_sma {
            names.push("sma");
        }
        if self.use_rsi {
            names.push("rsi");
        }
        names
    }

    /// Extract the feature matrix, one row per candle.
    pub fn extract(&self, candles: &[Candle]) -> Array2<f64> {
        let n = candles.len();
        let mut matrix = Array2::zeros((n, self.feature_count()));

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let sma = if self.use_sma {
            simple_moving_average(&closes, self.sma_period)
        } else {
            Vec::new()
        };
        let rsi = if self.use_rsi {
            relative_strength_index(&closes, self.rsi_period)
        } else {
            Vec::new()
        };

        for (i, candle) in candles.iter().enumerate() {
            let mut row = Vec::with_capacity(matrix.ncols());

            if self.use_ohlc {
                row.extend_from_slice(&[candle.open, candle.high, candle.low, candle.close]);
            }
            if self.use_volume {
                row.push(candle.volume);
            }
            if self.use_range {
                row.push(candle.range());
            }
            if self.use_returns {
                let ret = if i > 0 && closes[i - 1] > 0.0 {
                    (closes[i] - closes[i - 1]) / closes[i - 1]
                } else {
                    0.0
                };
                row.push(ret);
            }
            if self.use_sma {
                row.push(sma[i]);
            }
            if self.use_rsi {
                row.push(rsi[i]);
            }

            for (j, value) in row.into_iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }

        matrix
    }

    /// Close prices of a candle series
    pub fn extract_closes(candles: &[Candle]) -> Vec<f64> {
        candles.iter().map(|c| c.close).collect()
    }
}

/// Simple moving average; bars before the first full period carry the raw price.
fn simple_moving_average(prices: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(prices.len());
    for i in 0..prices.len() {
        if period == 0 || i + 1 < period {
            out.push(prices[i]);
        } else {
            let start = i + 1 - period;
            let sum: f64 = prices[start..=i].iter().sum();
            out.push(sum / period as f64);
        }
    }
    out
}

/// RSI over simple average gains/losses; neutral 50 until the window fills.
fn relative_strength_index(prices: &[f64], period: usize) -> Vec<f64> {
    let n = prices.len();
    if n < period + 1 || period == 0 {
        return vec![50.0; n];
    }

    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let change = prices[i] - prices[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let mut rsi = vec![50.0; n];
    for i in period..n {
        let avg_gain: f64 = gains[i + 1 - period..=i].iter().sum::<f64>() / period as f64;
        let avg_loss: f64 = losses[i + 1 - period..=i].iter().sum::<f64>() / period as f64;

        rsi[i] = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
    }
    rsi
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_candles() -> Vec<Candle> {
        vec![
            Candle::new(0, 100.0, 105.0, 95.0, 102.0, 1000.0, 100_000.0),
            Candle::new(1, 102.0, 108.0, 100.0, 107.0, 1200.0, 120_000.0),
            Candle::new(2, 107.0, 110.0, 105.0, 108.0, 800.0, 80_000.0),
        ]
    }

    #[test]
    fn test_matrix_shape() {
        let extractor = FeatureExtractor::default();
        let matrix = extractor.extract(&test_candles());
        assert_eq!(matrix.nrows(), 3);
        assert_eq!(matrix.ncols(), extractor.feature_count());
        assert_eq!(extractor.feature_names().len(), extractor.feature_count());
    }

    #[test]
    fn test_returns_column() {
        let extractor = FeatureExtractor {
            use_ohlc: false,
            use_volume: false,
            use_range: false,
            use_returns: true,
            ..FeatureExtractor::default()
        };
        let matrix = extractor.extract(&test_candles());

        assert_eq!(matrix[[0, 0]], 0.0);
        assert!((matrix[[1, 0]] - (107.0 - 102.0) / 102.0).abs() < 1e-12);
    }

    #[test]
    fn test_sma_warmup() {
        let sma = simple_moving_average(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(sma[0], 1.0);
        assert_eq!(sma[1], 2.0);
        assert!((sma[2] - 2.0).abs() < 1e-12);
        assert!((sma[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_monotonic_rise() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let rsi = relative_strength_index(&prices, 14);
        // All gains, no losses
        assert_eq!(rsi[29], 100.0);
        assert_eq!(rsi[5], 50.0); // warmup
    }
}
