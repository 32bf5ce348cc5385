//! Model configuration shared by LSTM and GRU networks.

use serde::{Deserialize, Serialize};

/// Immutable network configuration, passed by value into constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RnnConfig {
    /// Number of input features per time step
    pub input_size: usize,
    /// Hidden state size
    pub hidden_size: usize,
    /// Output size (1 for regression, 3 for action classification)
    pub output_size: usize,
    /// Number of stacked recurrent layers
    pub num_layers: usize,
    /// Learning rate used by `train` when none is given
    pub learning_rate: f64,
    /// Mini-batch size
    pub batch_size: usize,
}

impl RnnConfig {
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            hidden_size,
            output_size,
            num_layers: 1,
            learning_rate: 0.001,
            batch_size: 32,
        }
    }

    pub fn with_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers.max(1);
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Small network for quick experiments
    pub fn small(input_size: usize, output_size: usize) -> Self {
        Self::new(input_size, 32, output_size)
    }

    /// Two-layer medium network
    pub fn medium(input_size: usize, output_size: usize) -> Self {
        Self::new(input_size, 64, output_size).with_layers(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = RnnConfig::new(7, 64, 3)
            .with_layers(2)
            .with_learning_rate(0.01)
            .with_batch_size(16);

        assert_eq!(config.input_size, 7);
        assert_eq!(config.num_layers, 2);
        assert_eq!(config.learning_rate, 0.01);
        assert_eq!(config.batch_size, 16);
    }

    #[test]
    fn test_presets() {
        assert_eq!(RnnConfig::small(5, 3).hidden_size, 32);
        let medium = RnnConfig::medium(5, 1);
        assert_eq!(medium.hidden_size, 64);
        assert_eq!(medium.num_layers, 2);
    }

    #[test]
    fn test_degenerate_values_clamped() {
        let config = RnnConfig::new(5, 8, 1).with_layers(0).with_batch_size(0);
        assert_eq!(config.num_layers, 1);
        assert_eq!(config.batch_size, 1);
    }
}
