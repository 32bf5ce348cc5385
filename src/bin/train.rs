//! Train the LSTM action classifier and save its checkpoint.
//!
//! Usage: train [DATA_CSV]
//!
//! Without a data file a deterministic synthetic series is used, so the
//! whole pipeline runs offline. An existing checkpoint triggers an
//! interactive retrain prompt; answering no reuses the saved model.

use anyhow::Result;
use log::{info, warn};
use rnn_trader::data::{generate_series, SyntheticConfig};
use rnn_trader::model::{Lstm, Predictor, RnnConfig};
use rnn_trader::preprocessing::DataProcessor;
use rnn_trader::trading::Action;
use rnn_trader::utils::{accuracy, load_candles_csv, rmse, AppConfig};
use std::env;
use std::io::{BufRead, Write};

const MODEL_PATH: &str = "models/lstm_classifier.bin";
const PROCESSOR_PATH: &str = "models/processor.bin";

fn confirm(question: &str) -> bool {
    print!("{} [y/N] ", question);
    std::io::stdout().flush().ok();

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    let args: Vec<String> = env::args().collect();

    let candles = match args.get(1) {
        Some(path) => {
            info!("loading candles from {}", path);
            load_candles_csv(path)?
        }
        None => {
            warn!("no data file given, generating a synthetic series");
            generate_series(1000, 42, &SyntheticConfig::default())
        }
    };
    println!("{} candles loaded", candles.len());

    let training = &config.training;

    let retrain = if std::path::Path::new(MODEL_PATH).exists() {
        confirm(&format!("Checkpoint {} exists. Retrain?", MODEL_PATH))
    } else {
        true
    };

    // A reused checkpoint must come with its own fitted processor, so the
    // feature scale matches the one it was trained with
    let (model, processor, x, y, labels) = if retrain {
        let mut processor =
            DataProcessor::new(training.seq_len, training.horizon, training.neutral_band)?;
        let (x, y, labels) = processor.prepare_classification(&candles)?;
        (None, processor, x, y, labels)
    } else {
        let processor = DataProcessor::load(PROCESSOR_PATH)?;
        let (x, y, labels) = processor.classification_windows(&candles)?;
        (Some(Lstm::load(MODEL_PATH)?), processor, x, y, labels)
    };
    println!(
        "{} windows of {} bars x {} features",
        x.shape()[0],
        x.shape()[1],
        x.shape()[2]
    );

    let (x_train, x_test, y_train, y_test) =
        DataProcessor::train_test_split(&x, &y, training.train_ratio);
    let train_size = x_train.shape()[0];

    let model = match model {
        Some(model) => {
            println!("reusing saved checkpoint");
            model
        }
        None => {
            let model_config = RnnConfig::new(x.shape()[2], training.hidden_size, Action::COUNT)
                .with_layers(training.num_layers)
                .with_batch_size(training.batch_size)
                .with_learning_rate(training.learning_rate);

            let mut model = Lstm::from_config(model_config);
            println!("training on {} samples...", train_size);
            model.train(&x_train, &y_train, training.epochs, training.learning_rate)?;

            std::fs::create_dir_all("models")?;
            model.save(MODEL_PATH)?;
            processor.save(PROCESSOR_PATH)?;
            println!("saved checkpoint to {}", MODEL_PATH);
            model
        }
    };

    // Held-out evaluation
    let predicted: Vec<usize> = model
        .predict_series(&x_test)
        .iter()
        .map(|a| a.to_index())
        .collect();
    let actual: Vec<usize> = labels[train_size..].iter().map(|a| a.to_index()).collect();

    println!("test MSE:      {:.4}", model.evaluate(&x_test, &y_test));
    println!("test RMSE:     {:.4}", rmse(&model.predict(&x_test), &y_test));
    println!("test accuracy: {:.2}%", accuracy(&predicted, &actual) * 100.0);

    Ok(())
}
