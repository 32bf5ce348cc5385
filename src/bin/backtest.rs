//! Replay a trained classifier through the trade simulator.
//!
//! Usage: backtest [DATA_CSV]
//!
//! Loads the checkpoint written by `train`; when none is present a fresh
//! model is trained on the spot so the backtest still runs.

use anyhow::Result;
use log::{info, warn};
use rnn_trader::data::{generate_series, BybitClientSync, Candle, SyntheticConfig};
use rnn_trader::model::{Lstm, Predictor, RnnConfig};
use rnn_trader::preprocessing::DataProcessor;
use rnn_trader::trading::{Action, TradeSimulator};
use rnn_trader::utils::{
    export_trades_csv, load_candles_csv, max_drawdown, profit_factor, sharpe_ratio, win_rate,
    AppConfig,
};
use std::env;

const MODEL_PATH: &str = "models/lstm_classifier.bin";
const PROCESSOR_PATH: &str = "models/processor.bin";
const TRADES_PATH: &str = "backtest_trades.csv";

/// Train a throwaway model when no checkpoint exists yet.
fn train_fresh(config: &AppConfig, candles: &[Candle]) -> Result<(Lstm, DataProcessor)> {
    let training = &config.training;
    let mut processor =
        DataProcessor::new(training.seq_len, training.horizon, training.neutral_band)?;
    let (x, y, _) = processor.prepare_classification(candles)?;

    let model_config = RnnConfig::new(x.shape()[2], training.hidden_size, Action::COUNT)
        .with_layers(training.num_layers)
        .with_batch_size(training.batch_size);

    let mut model = Lstm::from_config(model_config);
    model.train(&x, &y, training.epochs, training.learning_rate)?;
    Ok((model, processor))
}

fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    let args: Vec<String> = env::args().collect();

    // A CSV path replays saved data, a bare symbol fetches live klines,
    // no argument falls back to a synthetic series
    let candles = match args.get(1) {
        Some(path) if std::path::Path::new(path).exists() => {
            info!("loading candles from {}", path);
            load_candles_csv(path)?
        }
        Some(symbol) => {
            info!("fetching {} candles for {}", config.data.limit, symbol);
            BybitClientSync::new().get_klines(symbol, &config.data.interval, config.data.limit)?
        }
        None => {
            warn!("no data file given, generating a synthetic series");
            generate_series(1000, 42, &SyntheticConfig::default())
        }
    };

    let (model, processor) = match (Lstm::load(MODEL_PATH), DataProcessor::load(PROCESSOR_PATH)) {
        (Ok(model), Ok(processor)) => {
            info!("loaded checkpoint from {}", MODEL_PATH);
            (model, processor)
        }
        _ => {
            warn!("no usable checkpoint, training a fresh model");
            train_fresh(&config, &candles)?
        }
    };

    let (windows, prices) = processor.simulation_windows(&candles)?;
    let actions = model.predict_series(&windows);

    let mut simulator = TradeSimulator::new(config.simulation)?;
    let report = simulator.run(&prices, &actions)?;

    println!("{}", report);

    let pnls: Vec<f64> = report.trades.iter().map(|t| t.pnl).collect();
    let returns: Vec<f64> = report
        .balance_history
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();

    // 1h bars -> ~8760 periods per year
    println!("Sharpe Ratio:      {:>12.2}", sharpe_ratio(&returns, 8760.0));
    println!("Max Drawdown:      {:>11.2}%", max_drawdown(&report.balance_history) * 100.0);
    println!("Win Rate:          {:>11.2}%", win_rate(&pnls) * 100.0);
    println!("Profit Factor:     {:>12.2}", profit_factor(&pnls));

    let action_counts = actions.iter().fold([0usize; 3], |mut counts, a| {
        counts[a.to_index()] += 1;
        counts
    });
    println!(
        "Actions: {} hold / {} buy / {} sell",
        action_counts[0], action_counts[1], action_counts[2]
    );

    export_trades_csv(&report.trades, TRADES_PATH)?;
    println!("trade log saved to {}", TRADES_PATH);

    Ok(())
}
