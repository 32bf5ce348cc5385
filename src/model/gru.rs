//! GRU network for sequence forecasting and classification.

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

/// A single GRU cell (one layer, one time step).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GruCell {
    pub input_size: usize,
    pub hidden_size: usize,

    // update gate
    w_iz: Array2<f64>,
    w_hz: Array2<f64>,
    b_z: Array1<f64>,

    // reset gate
    w_ir: Array2<f64>,
    w_hr: Array2<f64>,
    b_r: Array1<f64>,

    // candidate state
    w_ih: Array2<f64>,
    w_hh: Array2<f64>,
    b_h: Array1<f64>,
}

impl GruCell {
    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        let limit = (1.0 / hidden_size as f64).sqrt();
        let input_weights = || Array2::random((hidden_size, input_size), Uniform::new(-limit, limit));
        let hidden_weights = || Array2::random((hidden_size, hidden_size), Uniform::new(-limit, limit));

        Self {
            input_size,
            hidden_size,
            w_iz: input_weights(),
            w_hz: hidden_weights(),
            b_z: Array1::zeros(hidden_size),
            w_ir: input_weights(),
            w_hr: hidden_weights(),
            b_r: Array1::zeros(hidden_size),
            w_ih: input_weights(),
            w_hh: hidden_weights(),
            b_h: Array1::zeros(hidden_size),
        }
    }

    /// One time step: h_prev -> h_next.
    pub fn forward(&self, x: &ArrayView1<f64>, h_prev: &Array1<f64>) -> Array1<f64> {
        let z = sigmoid(self.w_iz.dot(x) + self.w_hz.dot(h_prev) + &self.b_z);
        let r = sigmoid(self.w_ir.dot(x) + self.w_hr.dot(h_prev) + &self.b_r);

        let gated = &r * h_prev;
        let candidate = tanh(self.w_ih.dot(x) + self.w_hh.dot(&gated) + &self.b_h);

        let keep = z.mapv(|v| 1.0 - v);
        &keep * h_prev + &z * &candidate
    }

    pub fn init_state(&self) -> Array1<f64> {
        Array1::zeros(self.hidden_size)
    }
}

/// Multi-layer GRU with a dense output head.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gru {
    pub config: RnnConfig,
    cells: Vec<GruCell>,
    output_layer: Dense,
    /// Average loss per epoch of the last training run
    #[serde(skip)]
    pub loss_history: Vec<f64>,
}

impl Gru {
    pub fn new(input_size: usize, hidden_size: usize, output_size: usize) -> Self {
        Self::from_config(RnnConfig::new(input_size, hidden_size, output_size))
    }

    pub fn from_config(config: RnnConfig) -> Self {
        let mut cells = Vec::with_capacity(config.num_layers);
        cells.push(GruCell::new(config.input_size, config.hidden_size));
        for _ in 1..config.num_layers {
            cells.push(GruCell::new(config.hidden_size, config.hidden_size));
        }

        let output_layer = Dense::new(config.hidden_size, config.output_size, Activation::Linear);

        Self {
            config,
            cells,
            output_layer,
            loss_history: Vec::new(),
        }
    }

    fn hidden_for_window(&self, window: &ArrayView2<f64>) -> Array1<f64> {
        let mut states: Vec<Array1<f64>> = self.cells.iter().map(GruCell::init_state).collect();

        for t in 0..window.nrows() {
            let mut layer_input = window.row(t).to_owned();
            for (layer, cell) in self.cells.iter().enumerate() {
                let h = cell.forward(&layer_input.view(), &states[layer]);
                layer_input = h.clone();
                states[layer] = h;
            }
        }

        states.pop().expect("at least one layer")
    }

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

    /// Train on mini-batches; see `Lstm::train` for the scheme.
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
                info!("loaded GRU checkpoint from {}", path);
                model
            }
            Err(_) => {
                info!("no GRU checkpoint at {}, starting fresh", path);
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
