//! Three-way trade-direction labels from forward returns.

use super::features::FeatureExtractor;
use crate::data::Candle;
use crate::trading::Action;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Labeling parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LabelConfig {
    /// How many bars ahead the reference close lies
    pub horizon: usize,
    /// Neutral band around zero return; |return| <= band labels Hold
    pub neutral_band: f64,
}

impl LabelConfig {
    pub fn new(horizon: usize, neutral_band: f64) -> Result<Self> {
        if horizon == 0 {
            return Err(anyhow!("label horizon must be at least 1"));
        }
        if !neutral_band.is_finite() || neutral_band < 0.0 {
            return Err(anyhow!("neutral band must be a non-negative finite number"));
        }
        Ok(Self {
            horizon,
            neutral_band,
        })
    }
}

/// Derives a `Buy`/`Sell`/`Hold` label per bar by comparing each close with
/// the close `horizon` bars ahead. Bars without a forward reference (the
/// trailing `horizon` bars) produce no label, so the output is shorter than
/// the input by exactly `horizon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Labeler {
    config: LabelConfig,
}

impl Labeler {
    pub fn new(config: LabelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Label a close-price series. Returns `closes.len() - horizon` labels
    /// (empty when the series is shorter than that).
    ///
    /// A forward return strictly above the band labels `Buy`, strictly
    /// below the negated band labels `Sell`; everything inside the band,
    /// including an exact tie at zero, labels `Hold`. A non-finite return
    /// (zero current close) also labels `Hold`.
    pub fn label(&self, closes: &[f64]) -> Vec<Action> {
        let k = self.config.horizon;
        if closes.len() <= k {
            return Vec::new();
        }

        let band = self.config.neutral_band;
        let mut labels = Vec::with_capacity(closes.len() - k);

        for i in 0..closes.len() - k {
            let ret = (closes[i + k] - closes[i]) / closes[i];
            let label = if !ret.is_finite() {
                Action::Hold
            } else if ret > band {
                Action::Buy
            } else if ret < -band {
                Action::Sell
            } else {
                Action::Hold
            };
            labels.push(label);
        }

        labels
    }

    /// Label a candle series by its closes.
    pub fn label_candles(&self, candles: &[Candle]) -> Vec<Action> {
        self.label(&FeatureExtractor::extract_closes(candles))
    }
}
