//! Fixed-length sequence windows over a feature matrix.

use crate::trading::Action;
use anyhow::{anyhow, Result};
use ndarray::{s, Array2, ArrayView2};

/// Slices a feature matrix into overlapping windows of `seq_len` rows,
/// pairing window `i` (rows `[i, i+seq_len)`) with the label attached to
/// its last row. The label's forward shift already happened in the
/// labeler, so no further shifting occurs here.
#[derive(Debug, Clone, Copy)]
pub struct SequenceWindower {
    seq_len: usize,
}

impl SequenceWindower {
    pub fn new(seq_len: usize) -> Result<Self> {
        if seq_len == 0 {
            return Err(anyhow!("sequence length must be at least 1"));
        }
        Ok(Self { seq_len })
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Number of (window, label) pairs for a matrix with `labels.len()`
    /// labeled leading rows.
    pub fn count(&self, features: &Array2<f64>, labels: &[Action]) -> usize {
        let labeled = labels.len().min(features.nrows());
        labeled.saturating_sub(self.seq_len - 1)
    }

    /// Iterate (window, label) pairs. The iterator is lazy, finite and
    /// restartable: every call starts a fresh pass yielding the full
    /// deterministic set, so consumers are free to collect, batch and
    /// shuffle.
    pub fn windows<'a>(
        &self,
        features: &'a Array2<f64>,
        labels: &'a [Action],
    ) -> WindowIter<'a> {
        WindowIter {
            features,
            labels,
            seq_len: self.seq_len,
            pos: 0,
            end: self.count(features, labels),
        }
    }
}

/// Iterator over (window, label) pairs; see [`SequenceWindower::windows`].
pub struct WindowIter<'a> {
    features: &'a Array2<f64>,
    labels: &'a [Action],
    seq_len: usize,
    pos: usize,
    end: usize,
}

impl<'a> Iterator for WindowIter<'a> {
    type Item = (ArrayView2<'a, f64>, Action);

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.end {
            return None;
        }
        let i = self.pos;
        self.pos += 1;

        let window = self.features.slice(s![i..i + self.seq_len, ..]);
        let label = self.labels[i + self.seq_len - 1];
        Some((window, label))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for WindowIter<'a> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_series, SyntheticConfig};
    use crate::preprocessing::{FeatureExtractor, LabelConfig, Labeler};
    use ndarray::Array2;

    fn feature_rows(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, 2), |(i, j)| (i * 10 + j) as f64)
    }

    #[test]
    fn test_rejects_zero_seq_len() {
        assert!(SequenceWindower::new(0).is_err());
        assert_eq!(SequenceWindower::new(4).unwrap().seq_len(), 4);
    }

    #[test]
    fn test_pair_count_matches_bar_series() {
        // For a bar series of length N with horizon 1, the windower must
        // produce exactly N - seq_len pairs.
        let n = 60;
        let seq_len = 10;
        let candles = generate_series(n, 11, &SyntheticConfig::default());

        let features = FeatureExtractor::default().extract(&candles);
        let labels = Labeler::new(LabelConfig::new(1, 0.0).unwrap()).label_candles(&candles);
        let windower = SequenceWindower::new(seq_len).unwrap();

        let pairs: Vec<_> = windower.windows(&features, &labels).collect();
        assert_eq!(pairs.len(), n - seq_len);
        for (window, _) in &pairs {
            assert_eq!(window.nrows(), seq_len);
        }
    }

    #[test]
    fn test_window_rows_are_consecutive() {
        let features = feature_rows(8);
        let labels = vec![Action::Hold; 7];
        let windower = SequenceWindower::new(3).unwrap();

        let (first, _) = windower.windows(&features, &labels).next().unwrap();
        assert_eq!(first[[0, 0]], 0.0);
        assert_eq!(first[[1, 0]], 10.0);
        assert_eq!(first[[2, 0]], 20.0);
    }

    #[test]
    fn test_label_is_last_row_of_window() {
        let features = feature_rows(6);
        let labels = vec![
            Action::Hold,
            Action::Hold,
            Action::Buy,
            Action::Sell,
            Action::Hold,
        ];
        let windower = SequenceWindower::new(3).unwrap();

        let collected: Vec<Action> = windower
            .windows(&features, &labels)
            .map(|(_, label)| label)
            .collect();
        // Window 0 ends at row 2 -> Buy, window 1 ends at row 3 -> Sell, ...
        assert_eq!(collected, vec![Action::Buy, Action::Sell, Action::Hold]);
    }

    #[test]
    fn test_restartable_and_deterministic() {
        let features = feature_rows(20);
        let labels = vec![Action::Buy; 19];
        let windower = SequenceWindower::new(4).unwrap();

        let first_pass: Vec<_> = windower
            .windows(&features, &labels)
            .map(|(w, l)| (w.to_owned(), l))
            .collect();
        let second_pass: Vec<_> = windower
            .windows(&features, &labels)
            .map(|(w, l)| (w.to_owned(), l))
            .collect();

        assert_eq!(first_pass.len(), second_pass.len());
        for ((w1, l1), (w2, l2)) in first_pass.iter().zip(second_pass.iter()) {
            assert_eq!(w1, w2);
            assert_eq!(l1, l2);
        }
    }

    #[test]
    fn test_short_input_yields_nothing() {
        let features = feature_rows(3);
        let labels = vec![Action::Hold; 2];
        let windower = SequenceWindower::new(5).unwrap();
        assert_eq!(windower.windows(&features, &labels).count(), 0);
    }
}
