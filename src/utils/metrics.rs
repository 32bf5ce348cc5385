//! Model and strategy evaluation metrics.

use ndarray::Array2;

/// Mean squared error.
pub fn mse(predictions: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    let diff = predictions - targets;
    diff.mapv(|x| x * x).mean().unwrap_or(0.0)
}

/// Root mean squared error.
pub fn rmse(predictions: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    mse(predictions, targets).sqrt()
}

/// Share of matching entries between two class-index sequences.
pub fn accuracy(predicted: &[usize], actual: &[usize]) -> f64 {
    if predicted.is_empty() || predicted.len() != actual.len() {
        return 0.0;
    }
    let correct = predicted
        .iter()
        .zip(actual.iter())
        .filter(|(p, a)| p == a)
        .count();
    correct as f64 / predicted.len() as f64
}

/// Annualized Sharpe ratio over periodic returns.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 {
        return 0.0;
    }

    (mean * periods_per_year) / (std_dev * periods_per_year.sqrt())
}

/// Maximum peak-to-trough drawdown of an equity series, as a fraction.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    if equity.is_empty() {
        return 0.0;
    }

    let mut peak = equity[0];
    let mut max_dd = 0.0;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (peak - value) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Share of strictly positive values.
pub fn win_rate(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    pnls.iter().filter(|&&p| p > 0.0).count() as f64 / pnls.len() as f64
}

/// Gross profit over gross loss; infinite when there are no losses.
pub fn profit_factor(pnls: &[f64]) -> f64 {
    let gains: f64 = pnls.iter().filter(|&&p| p > 0.0).sum();
    let losses: f64 = pnls.iter().filter(|&&p| p < 0.0).map(|p| p.abs()).sum();

    if losses == 0.0 {
        if gains > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    } else {
        gains / losses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mse_rmse() {
        let targets = array![[1.0], [2.0], [3.0]];
        let predictions = array![[1.0], [2.0], [4.0]];

        assert!((mse(&predictions, &targets) - 1.0 / 3.0).abs() < 1e-12);
        assert!((rmse(&predictions, &targets) - (1.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[0, 1, 2, 1], &[0, 1, 1, 1]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
        assert_eq!(accuracy(&[0], &[0, 1]), 0.0);
    }

    #[test]
    fn test_sharpe_finite() {
        let returns = vec![0.01, -0.02, 0.015, 0.005, -0.01, 0.02];
        assert!(sharpe_ratio(&returns, 252.0).is_finite());
        assert_eq!(sharpe_ratio(&[], 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.01, 0.01], 252.0), 0.0); // zero variance
    }

    #[test]
    fn test_max_drawdown() {
        let equity = vec![100.0, 110.0, 105.0, 120.0, 90.0, 100.0];
        assert!((max_drawdown(&equity) - 0.25).abs() < 1e-12); // (120-90)/120
    }

    #[test]
    fn test_win_rate_and_profit_factor() {
        let pnls = vec![10.0, -5.0, 20.0, -5.0];
        assert_eq!(win_rate(&pnls), 0.5);
        assert!((profit_factor(&pnls) - 3.0).abs() < 1e-12);

        assert_eq!(profit_factor(&[1.0, 2.0]), f64::INFINITY);
        assert_eq!(profit_factor(&[]), 0.0);
    }
}
