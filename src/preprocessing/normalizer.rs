//! Per-column min-max scaling to [0, 1].

use anyhow::{anyhow, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Min-max normalizer fitted per feature column.
///
/// The fitted bounds are serialized together with the owning processor so
/// the exact transform used during training is reapplied at inference.
/// Refitting on evaluation data would shift the feature scale between
/// training and inference; use [`MinMaxNormalizer::fit_transform`] once on
/// the training pass and [`MinMaxNormalizer::transform`] everywhere else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinMaxNormalizer {
    min_vals: Option<Array1<f64>>,
    max_vals: Option<Array1<f64>>,
}

impl MinMaxNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.min_vals.is_some()
    }

    /// Learn per-column minima and maxima.
    pub fn fit(&mut self, data: &Array2<f64>) {
        let mut mins = Array1::from_elem(data.ncols(), f64::INFINITY);
        let mut maxs = Array1::from_elem(data.ncols(), f64::NEG_INFINITY);

        for row in data.rows() {
            for (j, &value) in row.iter().enumerate() {
                if value < mins[j] {
                    mins[j] = value;
                }
                if value > maxs[j] {
                    maxs[j] = value;
                }
            }
        }

        self.min_vals = Some(mins);
        self.max_vals = Some(maxs);
    }

    /// Apply the fitted transform. Columns with zero range map to 0.5.
    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
        let mins = self
            .min_vals
            .as_ref()
            .ok_or_else(|| anyhow!("normalizer is not fitted"))?;
        let maxs = self.max_vals.as_ref().expect("fitted implies both bounds");

        let mut out = data.clone();
        for mut row in out.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                let range = maxs[j] - mins[j];
                *value = if range == 0.0 {
                    0.5
                } else {
                    (*value - mins[j]) / range
                };
            }
        }
        Ok(out)
    }

    /// Fit on `data` and transform it in one pass (training only).
    pub fn fit_transform(&mut self, data: &Array2<f64>) -> Array2<f64> {
        self.fit(data);
        self.transform(data).expect("just fitted")
    }

    /// Map a normalized value of column `col` back to the original scale.
    pub fn inverse_column(&self, col: usize, value: f64) -> Result<f64> {
        let mins = self
            .min_vals
            .as_ref()
            .ok_or_else(|| anyhow!("normalizer is not fitted"))?;
        let maxs = self.max_vals.as_ref().expect("fitted implies both bounds");
        if col >= mins.len() {
            return Err(anyhow!("column {} out of range", col));
        }
        Ok(value * (maxs[col] - mins[col]) + mins[col])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_fit_transform_range() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let mut normalizer = MinMaxNormalizer::new();
        let scaled = normalizer.fit_transform(&data);

        assert_eq!(scaled[[0, 0]], 0.0);
        assert_eq!(scaled[[2, 0]], 1.0);
        assert!((scaled[[1, 1]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_transform_requires_fit() {
        let normalizer = MinMaxNormalizer::new();
        assert!(normalizer.transform(&array![[1.0]]).is_err());
    }

    #[test]
    fn test_fitted_transform_is_reused_unchanged() {
        let train = array![[0.0], [10.0]];
        let eval = array![[5.0], [20.0]];

        let mut normalizer = MinMaxNormalizer::new();
        normalizer.fit_transform(&train);
        let scaled = normalizer.transform(&eval).unwrap();

        // Out-of-range evaluation values extrapolate instead of refitting
        assert!((scaled[[0, 0]] - 0.5).abs() < 1e-12);
        assert!((scaled[[1, 0]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column() {
        let data = array![[7.0], [7.0], [7.0]];
        let mut normalizer = MinMaxNormalizer::new();
        let scaled = normalizer.fit_transform(&data);
        assert_eq!(scaled[[1, 0]], 0.5);
    }

    #[test]
    fn test_inverse_column() {
        let data = array![[100.0], [200.0]];
        let mut normalizer = MinMaxNormalizer::new();
        normalizer.fit(&data);

        let restored = normalizer.inverse_column(0, 0.25).unwrap();
        assert!((restored - 125.0).abs() < 1e-12);
    }
}
