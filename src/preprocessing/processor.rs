//! End-to-end preparation of candle series into train-ready tensors.

use super::features::FeatureExtractor;
use super::labeler::{LabelConfig, Labeler};
use super::normalizer::MinMaxNormalizer;
use super::windower::SequenceWindower;
use crate::data::Candle;
use crate::trading::Action;
use anyhow::{anyhow, Result};
use ndarray::{s, Array2, Array3};
use serde::{Deserialize, Serialize};

/// Turns raw candles into normalized, windowed training data.
///
/// The min-max normalizer is fitted exactly once, on the first training
/// pass, and is persisted with the processor; every later call -
/// inference windows, simulation windows - reuses the fitted transform so
/// training and evaluation see the same feature scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataProcessor {
    /// Window length fed to the sequence model
    pub seq_len: usize,
    labeler: Labeler,
    extractor: FeatureExtractor,
    normalizer: MinMaxNormalizer,
    /// Feature column used as the regression target (close)
    pub target_index: usize,
}

impl DataProcessor {
    /// Create a processor with the default feature set.
    ///
    /// Fails fast on a zero `seq_len` or `horizon`, or a negative
    /// `neutral_band`.
    pub fn new(seq_len: usize, horizon: usize, neutral_band: f64) -> Result<Self> {
        // Validates seq_len; the windower itself is rebuilt per call
        SequenceWindower::new(seq_len)?;
        let label_config = LabelConfig::new(horizon, neutral_band)?;

        Ok(Self {
            seq_len,
            labeler: Labeler::new(label_config),
            extractor: FeatureExtractor::default(),
            normalizer: MinMaxNormalizer::new(),
            target_index: 3,
        })
    }

    /// Replace the feature extractor (before the first fit).
    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn label_config(&self) -> &LabelConfig {
        self.labeler.config()
    }

    pub fn feature_count(&self) -> usize {
        self.extractor.feature_count()
    }

    pub fn is_fitted(&self) -> bool {
        self.normalizer.is_fitted()
    }

    fn check_length(&self, candles: &[Candle]) -> Result<()> {
        let needed = self.seq_len + self.labeler.config().horizon;
        if candles.len() < needed {
            return Err(anyhow!(
                "not enough candles: {} given, at least {} required",
                candles.len(),
                needed
            ));
        }
        Ok(())
    }

    /// Prepare classification data: X windows, one-hot targets and the raw
    /// label sequence. Fits the normalizer.
    pub fn prepare_classification(
        &mut self,
        candles: &[Candle],
    ) -> Result<(Array3<f64>, Array2<f64>, Vec<Action>)> {
        self.check_length(candles)?;

        let features = self.extractor.extract(candles);
        let normalized = self.normalizer.fit_transform(&features);
        self.build_classification(&normalized, candles)
    }

    /// Classification windows through the already-fitted transform, for
    /// evaluating against a saved checkpoint without refitting.
    pub fn classification_windows(
        &self,
        candles: &[Candle],
    ) -> Result<(Array3<f64>, Array2<f64>, Vec<Action>)> {
        if !self.is_fitted() {
            return Err(anyhow!("processor is not fitted; run a training pass first"));
        }
        self.check_length(candles)?;

        let features = self.extractor.extract(candles);
        let normalized = self.normalizer.transform(&features)?;
        self.build_classification(&normalized, candles)
    }

    fn build_classification(
        &self,
        normalized: &Array2<f64>,
        candles: &[Candle],
    ) -> Result<(Array3<f64>, Array2<f64>, Vec<Action>)> {
        let labels = self.labeler.label_candles(candles);

        let windower = SequenceWindower::new(self.seq_len)?;
        let n_windows = windower.count(normalized, &labels);
        let n_features = normalized.ncols();

        let mut x = Array3::zeros((n_windows, self.seq_len, n_features));
        let mut y = Array2::zeros((n_windows, Action::COUNT));
        let mut window_labels = Vec::with_capacity(n_windows);

        for (i, (window, label)) in windower.windows(normalized, &labels).enumerate() {
            x.slice_mut(s![i, .., ..]).assign(&window);
            y[[i, label.to_index()]] = 1.0;
            window_labels.push(label);
        }

        Ok((x, y, window_labels))
    }

    /// Prepare regression data: X windows and the normalized close
    /// `horizon` bars past each window's end. Fits the normalizer.
    pub fn prepare_regression(&mut self, candles: &[Candle]) -> Result<(Array3<f64>, Array2<f64>)> {
        self.check_length(candles)?;

        let features = self.extractor.extract(candles);
        let normalized = self.normalizer.fit_transform(&features);

        let horizon = self.labeler.config().horizon;
        let n = normalized.nrows();
        let n_windows = n - self.seq_len - horizon + 1;
        let n_features = normalized.ncols();

        let mut x = Array3::zeros((n_windows, self.seq_len, n_features));
        let mut y = Array2::zeros((n_windows, 1));

        for i in 0..n_windows {
            x.slice_mut(s![i, .., ..])
                .assign(&normalized.slice(s![i..i + self.seq_len, ..]));
            y[[i, 0]] = normalized[[i + self.seq_len + horizon - 1, self.target_index]];
        }

        Ok((x, y))
    }

    /// Windows for replaying a model over history: one window per bar that
    /// has `seq_len` bars of context, paired with the raw close of its
    /// last bar. Requires a fitted normalizer.
    pub fn simulation_windows(&self, candles: &[Candle]) -> Result<(Array3<f64>, Vec<f64>)> {
        if !self.is_fitted() {
            return Err(anyhow!("processor is not fitted; run a training pass first"));
        }
        if candles.len() < self.seq_len {
            return Err(anyhow!(
                "not enough candles: {} given, at least {} required",
                candles.len(),
                self.seq_len
            ));
        }

        let features = self.extractor.extract(candles);
        let normalized = self.normalizer.transform(&features)?;

        let n_windows = candles.len() - self.seq_len + 1;
        let n_features = normalized.ncols();

        let mut x = Array3::zeros((n_windows, self.seq_len, n_features));
        let mut prices = Vec::with_capacity(n_windows);

        for i in 0..n_windows {
            x.slice_mut(s![i, .., ..])
                .assign(&normalized.slice(s![i..i + self.seq_len, ..]));
            prices.push(candles[i + self.seq_len - 1].close);
        }

        Ok((x, prices))
    }

    /// The single most recent window, for a live prediction.
    pub fn prepare_latest(&self, candles: &[Candle]) -> Result<Array3<f64>> {
        let (windows, _) = self.simulation_windows(candles)?;
        let last = windows.shape()[0] - 1;
        Ok(windows.slice(s![last..last + 1, .., ..]).to_owned())
    }

    /// Undo the target-column scaling of a regression output.
    pub fn inverse_transform_price(&self, normalized_price: f64) -> Result<f64> {
        self.normalizer.inverse_column(self.target_index, normalized_price)
    }

    /// Chronological split into train and test portions.
    pub fn train_test_split(
        x: &Array3<f64>,
        y: &Array2<f64>,
        train_ratio: f64,
    ) -> (Array3<f64>, Array3<f64>, Array2<f64>, Array2<f64>) {
        let n = x.shape()[0];
        let train_size = (n as f64 * train_ratio) as usize;

        (
            x.slice(s![..train_size, .., ..]).to_owned(),
            x.slice(s![train_size.., .., ..]).to_owned(),
            y.slice(s![..train_size, ..]).to_owned(),
            y.slice(s![train_size.., ..]).to_owned(),
        )
    }

    /// Split samples into batches of at most `batch_size`.
    pub fn create_batches(
        x: &Array3<f64>,
        y: &Array2<f64>,
        batch_size: usize,
    ) -> Vec<(Array3<f64>, Array2<f64>)> {
        let n = x.shape()[0];
        let mut batches = Vec::new();

        let mut start = 0;
        while start < n {
            let end = (start + batch_size).min(n);
            batches.push((
                x.slice(s![start..end, .., ..]).to_owned(),
                y.slice(s![start..end, ..]).to_owned(),
            ));
            start = end;
        }

        batches
    }

    /// Persist the processor, fitted normalizer included.
    pub fn save(&self, path: &str) -> Result<()> {
        let encoded = bincode::serialize(self)?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    /// Load a previously saved processor.
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }
}
