//! LSTM network for sequence forecasting and classification.

use super::config::RnnConfig;
use super::layers::{Activation, Dense};
use crate::utils::metrics::mse;
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use ndarray::{s, Array1, Array2, Array3, ArrayView1, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

/// A single LSTM cell (one layer, one time step).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LstmCell {
    pub input_size: usize,
    pub hidden_size: usize,

    // input gate
    w_ii: Array2<f64>,
    w_hi: Array2<f64>,
    b_i: Array1<f64>,

    // forget gate
    w_if: Array2<f64>,
    w_hf: Array2<f64>,
    b_f: Array1<f64>,

    // cell candidate
    w_ig: Array2<f64>,
    w_hg: Array2<f64>,
    b_g: Array1<f64>,

    // output gate
    w_io: Array2<f64>,
    w_ho: Array2<f64>,
    b_o: Array1<f64>,
}

impl LstmCell {
    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        let limit = (1.0 / hidden_size as f64).sqrt();
        let input_weights = || Array2::random((hidden_size, input_size), Uniform::new(-limit, limit));
        let hidden_weights = || Array2::random((hidden_size, hidden_size), Uniform::new(-limit, limit));

        Self {
            input_size,
            hidden_size,
            w_ii: input_weights(),
            w_hi: hidden_weights(),
            b_i: Array1::zeros(hidden_size),
            w_if: input_weights(),
            w_hf: hidden_weights(),
            // forget gate biased open at init
            b_f: Array1::from_elem(hidden_size, 1.0),
            w_ig: input_weights(),
            w_hg: hidden_weights(),
            b_g: Array1::zeros(hidden_size),
            w_io: input_weights(),
            w_ho: hidden_weights(),
            b_o: Array1::zeros(hidden_size),
        }
    }

    /// One time step: (h_prev, c_prev) -> (h_next, c_next).
    pub fn forward(
        &self,
        x: &ArrayView1<f64>,
        h_prev: &Array1<f64>,
        c_prev: &Array1<f64>,
    ) -> (Array1<f64>, Array1<f64>) {
        let i_gate = sigmoid(self.w_ii.dot(x) + self.w_hi.dot(h_prev) + &self.b_i);
        let f_gate = sigmoid(self.w_if.dot(x) + self.w_hf.dot(h_prev) + &self.b_f);
        let g = tanh(self.w_ig.dot(x) + self.w_hg.dot(h_prev) + &self.b_g);
        let o_gate = sigmoid(self.w_io.dot(x) + self.w_ho.dot(h_prev) + &self.b_o);

        let c_next = &f_gate * c_prev + &i_gate * &g;
        let h_next = &o_gate * &tanh(c_next.clone());

        (h_next, c_next)
    }

    pub fn init_state(&self) -> (Array1<f64>, Array1<f64>) {
        (Array1::zeros(self.hidden_size), Array1::zeros(self.hidden_size))
    }
}

/// Multi-layer LSTM with a dense output head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lstm {
    pub config: RnnConfig,
    cells: Vec<LstmCell>,
    output_layer: Dense,
    /// Average loss per epoch of the last training run
    #[serde(skip)]
    pub loss_history: Vec<f64>,
}

impl Lstm {
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Self {
        Self::from_config(RnnConfig::new(input_size, hidden_size, output_size))
    }

    pub fn from_config(config: RnnConfig) -> Self {
        let mut cells = Vec::with_capacity(config.num_layers);
        cells.push(LstmCell::new(config.input_size, config.hidden_size));
        for _ in 1..config.num_layers {
            cells.push(LstmCell::new(config.hidden_size, config.hidden_size));
        }

        let output_layer = Dense::new(config.hidden_size, config.output_size, Activation::Linear);

        Self {
            config,
            cells,
            output_layer,
            loss_history: Vec::new(),
        }
    }

    /// Final hidden state of the top layer for one window.
    fn hidden_for_window(&self, window: &ArrayView2<f64>) -> Array1<f64> {
        let mut states: Vec<(Array1<f64>, Array1<f64>)> =
            self.cells.iter().map(LstmCell::init_state).collect();

        for t in 0..window.nrows() {
            let mut layer_input = window.row(t).to_owned();
            for (layer, cell) in self.cells.iter().enumerate() {
                let (h_prev, c_prev) = &states[layer];
                let (h, c) = cell.forward(&layer_input.view(), h_prev, c_prev);
                layer_input = h.clone();
                states[layer] = (h, c);
            }
        }

        states.pop().expect("at least one layer").0
    }

    /// Run the recurrence for every sample, returning final hidden states
    /// as rows of a [batch, hidden] matrix.
    fn forward_hidden(&self, x: &Array3<f64>) -> Array2<f64> {
        let batch = x.shape()[0];
        let mut hidden = Array2::zeros((batch, self.config.hidden_size));

        for b in 0..batch {
            let window = x.slice(s![b, .., ..]);
            hidden.row_mut(b).assign(&self.hidden_for_window(&window));
        }
        hidden
    }

    /// Forward pass: [batch, seq_len, features] -> [batch, output_size].
    pub fn forward(&self, x: &Array3<f64>) -> Array2<f64> {
        self.output_layer.forward_batch(&self.forward_hidden(x))
    }

    /// Output vector for a single window.
    pub fn forward_window(&self, window: ArrayView2<f64>) -> Array1<f64> {
        self.output_layer.forward(&self.hidden_for_window(&window))
    }

    /// Train on mini-batches. The recurrent pass is computed once per
    /// batch; the cached hidden states then drive a finite-difference
    /// update of the output head against an MSE loss.
    pub fn train(
        &mut self,
        x_train: &Array3<f64>,
        y_train: &Array2<f64>,
        epochs: usize,
        learning_rate: f64,
    ) -> Result<()> {
        let n_samples = x_train.shape()[0];
        let batch_size = self.config.batch_size.min(n_samples).max(1);

        self.loss_history.clear();

        let bar = ProgressBar::new(epochs as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) loss: {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        for _epoch in 0..epochs {
            let mut epoch_loss = 0.0;
            let mut n_batches = 0;

            for start in (0..n_samples).step_by(batch_size) {
                let end = (start + batch_size).min(n_samples);
                let x_batch = x_train.slice(s![start..end, .., ..]).to_owned();
                let y_batch = y_train.slice(s![start..end, ..]).to_owned();

                let hidden = self.forward_hidden(&x_batch);
                let loss = self.output_layer.fit_step(&hidden, &y_batch, learning_rate);

                epoch_loss += loss;
                n_batches += 1;
            }

            let avg_loss = epoch_loss / n_batches as f64;
            self.loss_history.push(avg_loss);
            bar.set_message(format!("{:.6}", avg_loss));
            bar.inc(1);
        }

        bar.finish_with_message("done");
        Ok(())
    }

    /// Predictions for a batch of windows.
    pub fn predict(&self, x: &Array3<f64>) -> Array2<f64> {
        self.forward(x)
    }

    /// MSE against targets.
    pub fn evaluate(&self, x: &Array3<f64>, y: &Array2<f64>) -> f64 {
        mse(&self.forward(x), y)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let encoded = bincode::serialize(self)?;
        std::fs::write(path, encoded)?;
        Ok(())
    }

    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }

    /// Load a checkpoint, or build a fresh model when none is present.
    pub fn load_or_else<F: FnOnce() -> Self>(path: &str, fallback: F) -> Self {
        match Self::load(path) {
            Ok(model) => {
                info!("loaded LSTM checkpoint from {}", path);
                model
            }
            Err(_) => {
                info!("no LSTM checkpoint at {}, starting fresh", path);
                fallback()
            }
        }
    }
}

fn sigmoid(x: Array1<f64>) -> Array1<f64> {
    x.mapv(|v| 1.0 / (1.0 + (-v).exp()))
}

fn tanh(x: Array1<f64>) -> Array1<f64> {
    x.mapv(f64::tanh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_shapes() {
        let cell = LstmCell::new(5, 10);
        let x = Array1::zeros(5);
        let (h, c) = cell.init_state();
        let (h_next, c_next) = cell.forward(&x.view(), &h, &c);

        assert_eq!(h_next.len(), 10);
        assert_eq!(c_next.len(), 10);
    }

    #[test]
    fn test_forward_shapes() {
        let model = Lstm::new(5, 16, 3);
        let x = Array3::zeros((2, 10, 5));
        assert_eq!(model.forward(&x).shape(), &[2, 3]);
    }

    #[test]
    fn test_stacked_layers() {
        let model = Lstm::from_config(RnnConfig::new(5, 8, 1).with_layers(2));
        let x = Array3::zeros((1, 6, 5));
        assert_eq!(model.forward(&x).shape(), &[1, 1]);
    }

    #[test]
    fn test_train_records_loss() {
        let mut model = Lstm::from_config(RnnConfig::new(2, 4, 1).with_batch_size(8));
        let x = Array3::from_elem((8, 3, 2), 0.5);
        let y = Array2::from_elem((8, 1), 1.0);

        model.train(&x, &y, 3, 0.05).unwrap();
        assert_eq!(model.loss_history.len(), 3);
    }

    #[test]
    fn test_checkpoint_round_trip() {
        let model = Lstm::new(3, 4, 2);
        let path = std::env::temp_dir().join("lstm_checkpoint_test.bin");
        let path = path.to_str().unwrap();

        model.save(path).unwrap();
        let restored = Lstm::load(path).unwrap();

        let x = Array3::from_elem((1, 5, 3), 0.3);
        assert_eq!(model.forward(&x), restored.forward(&x));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_or_else_falls_back() {
        let model = Lstm::load_or_else("/nonexistent/checkpoint.bin", || Lstm::new(2, 4, 3));
        assert_eq!(model.config.output_size, 3);
    }
}
