//! Dense output layer and activations.

use crate::utils::metrics::mse;
use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Activation {
    Linear,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(&self, x: Array1<f64>) -> Array1<f64> {
        match self {
            Activation::Linear => x,
            Activation::Sigmoid => x.mapv(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Tanh => x.mapv(f64::tanh),
        }
    }
}

/// Fully connected layer with Xavier-uniform initialized weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dense {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
    pub activation: Activation,
}

impl Dense {
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        let limit = (6.0 / (input_size + output_size) as f64).sqrt();
        Self {
            weights: Array2::random((output_size, input_size), Uniform::new(-limit, limit)),
            biases: Array1::zeros(output_size),
            activation,
        }
    }

    pub fn forward(&self, x: &Array1<f64>) -> Array1<f64> {
        self.activation.apply(self.weights.dot(x) + &self.biases)
    }

    /// Forward over a batch of row vectors.
    pub fn forward_batch(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((x.nrows(), self.weights.nrows()));
        for (i, row) in x.rows().into_iter().enumerate() {
            let y = self.activation.apply(self.weights.dot(&row) + &self.biases);
            out.row_mut(i).assign(&y);
        }
        out
    }

    /// One coordinate-wise update of weights and biases by central finite
    /// differences against an MSE loss on the given inputs. Returns the
    /// loss after the update.
    pub fn fit_step(&mut self, inputs: &Array2<f64>, targets: &Array2<f64>, learning_rate: f64) -> f64 {
        let epsilon = 1e-5;

        for i in 0..self.weights.nrows() {
            for j in 0..self.weights.ncols() {
                let original = self.weights[[i, j]];

                self.weights[[i, j]] = original + epsilon;
                let loss_plus = mse(&self.forward_batch(inputs), targets);
                self.weights[[i, j]] = original - epsilon;
                let loss_minus = mse(&self.forward_batch(inputs), targets);

                let grad = (loss_plus - loss_minus) / (2.0 * epsilon);
                self.weights[[i, j]] = original - learning_rate * grad;
            }
        }

        for i in 0..self.biases.len() {
            let original = self.biases[i];

            self.biases[i] = original + epsilon;
            let loss_plus = mse(&self.forward_batch(inputs), targets);
            self.biases[i] = original - epsilon;
            let loss_minus = mse(&self.forward_batch(inputs), targets);

            let grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            self.biases[i] = original - learning_rate * grad;
        }

        mse(&self.forward_batch(inputs), targets)
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_forward_shapes() {
        let layer = Dense::new(4, 3, Activation::Linear);
        let y = layer.forward(&Array1::zeros(4));
        assert_eq!(y.len(), 3);

        let batch = layer.forward_batch(&Array2::zeros((5, 4)));
        assert_eq!(batch.shape(), &[5, 3]);
    }

    #[test]
    fn test_fit_step_reduces_loss() {
        let mut layer = Dense::new(2, 1, Activation::Linear);
        let inputs = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
        let targets = array![[2.0], [3.0], [5.0]];

        let before = mse(&layer.forward_batch(&inputs), &targets);
        let mut after = before;
        for _ in 0..200 {
            after = layer.fit_step(&inputs, &targets, 0.1);
        }
        assert!(after < before);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&array![1.0, 2.0, 3.0]);
        assert!((probs.sum() - 1.0).abs() < 1e-12);
        assert!(probs[2] > probs[1] && probs[1] > probs[0]);
    }

    #[test]
    fn test_softmax_large_logits_stable() {
        let probs = softmax(&array![1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
    }
}
