//! LSTM and GRU sequence models with a shared dense output head.

mod config;
mod gru;
mod layers;
mod lstm;
mod predictor;

pub use config::RnnConfig;
pub use gru::{Gru, GruCell};
pub use layers::{softmax, Activation, Dense};
pub use lstm::{Lstm, LstmCell};
pub use predictor::{FnPredictor, Predictor};
