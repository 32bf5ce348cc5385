//! The model-facing contract of the trade simulator.

use super::gru::Gru;
use super::layers::softmax;
use super::lstm::Lstm;
use crate::trading::Action;
use ndarray::{s, Array1, Array3, ArrayView2};

/// Maps one feature window to a trade action. This is the only interface
/// the simulator requires of a model; it is agnostic to the architecture
/// behind it.
pub trait Predictor {
    fn predict(&self, window: ArrayView2<f64>) -> Action;

    /// Predict one action per window of a [batch, seq_len, features] stack.
    fn predict_series(&self, windows: &Array3<f64>) -> Vec<Action> {
        (0..windows.shape()[0])
            .map(|i| self.predict(windows.slice(s![i, .., ..])))
            .collect()
    }
}

/// Class distribution -> action with the highest probability.
fn argmax_action(logits: &Array1<f64>) -> Action {
    let probs = softmax(logits);
    let mut best = 0;
    for (i, &p) in probs.iter().enumerate() {
        if p > probs[best] {
            best = i;
        }
    }
    Action::from_index(best).unwrap_or(Action::Hold)
}

impl Predictor for Lstm {
    fn predict(&self, window: ArrayView2<f64>) -> Action {
        argmax_action(&self.forward_window(window))
    }
}

impl Predictor for Gru {
    fn predict(&self, window: ArrayView2<f64>) -> Action {
        argmax_action(&self.forward_window(window))
    }
}

/// Adapter turning a plain function into a predictor; handy for tests and
/// rule-based baselines.
pub struct FnPredictor<F>(pub F);

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(ArrayView2<f64>) -> Action,
{
    fn predict(&self, window: ArrayView2<f64>) -> Action {
        (self.0)(window)
    }
}
