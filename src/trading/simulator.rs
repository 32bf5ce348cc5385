//! Single-position trade simulator.
//!
//! Walks a close-price series together with per-bar model actions,
//! keeping at most one open position. A position opens on the first
//! Buy/Sell from flat and closes only on a strict directional reversal
//! (Buy closes a short, Sell closes a long), which immediately opens the
//! opposite position at the same bar. Hold and same-direction actions
//! never change state.
//!
//! Bookkeeping: cash moves when a position is opened from flat (the stake,
//! `balance * position_fraction`, is set aside) and when a position closes
//! (realized pnl is credited). On a reversal the locked stake rolls into
//! the new position, re-marked to `balance * position_fraction`, without a
//! second cash movement. A position still open when the series ends is
//! never force-closed: the reported final balance includes neither its
//! stake nor its paper pnl.

use super::action::Action;
use super::position::{Position, TradeRecord};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors of the trading layer
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid simulator config: {0}")]
    InvalidConfig(String),

    #[error("empty price series")]
    EmptyInput,

    #[error("length mismatch: {prices} prices vs {actions} actions")]
    LengthMismatch { prices: usize, actions: usize },
}

/// Simulator parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Starting cash balance
    pub initial_balance: f64,
    /// Fraction of the current balance staked per position
    pub position_fraction: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            position_fraction: 0.1,
        }
    }
}

impl SimulatorConfig {
    pub fn new(initial_balance: f64, position_fraction: f64) -> Result<Self, SimError> {
        let config = Self {
            initial_balance,
            position_fraction,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), SimError> {
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "initial balance must be positive, got {}",
                self.initial_balance
            )));
        }
        if !self.position_fraction.is_finite()
            || self.position_fraction <= 0.0
            || self.position_fraction > 1.0
        {
            return Err(SimError::InvalidConfig(format!(
                "position fraction must be in (0, 1], got {}",
                self.position_fraction
            )));
        }
        Ok(())
    }
}

/// Aggregate results of one simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub num_trades: usize,
    /// Realized trades with pnl > 0
    pub num_profitable: usize,
    pub mean_pnl: f64,
    /// Ordered log of realized trades
    pub trades: Vec<TradeRecord>,
    /// Balance after every processed bar
    pub balance_history: Vec<f64>,
}

impl std::fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Simulation Report ===")?;
        writeln!(f, "Initial Balance:   {:>12.2}", self.initial_balance)?;
        writeln!(f, "Final Balance:     {:>12.2}", self.final_balance)?;
        writeln!(f, "Realized Trades:   {:>12}", self.num_trades)?;
        writeln!(f, "Profitable Trades: {:>12}", self.num_profitable)?;
        writeln!(f, "Mean Trade PnL:    {:>12.4}", self.mean_pnl)
    }
}

/// The simulator. Owns the full ledger state; `run` resets it first, so
/// repeated runs over identical inputs produce bit-identical results.
#[derive(Debug, Clone)]
pub struct TradeSimulator {
    config: SimulatorConfig,
    balance: f64,
    position: Option<Position>,
    trades: Vec<TradeRecord>,
    cursor: usize,
}

impl TradeSimulator {
    /// Fails fast on invalid configuration.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            balance: config.initial_balance,
            position: None,
            trades: Vec::new(),
            cursor: 0,
        })
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn open_position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// Restore the pristine post-construction state.
    pub fn reset(&mut self) {
        self.balance = self.config.initial_balance;
        self.position = None;
        self.trades.clear();
        self.cursor = 0;
    }

    /// Process one bar: the current close price and the model's action.
    pub fn step(&mut self, price: f64, action: Action) {
        match (self.position, action.direction()) {
            // Flat and the action implies a direction: open
            (None, Some(direction)) => {
                let reserved = self.balance * self.config.position_fraction;
                self.balance -= reserved;
                self.position = Some(Position {
                    direction,
                    entry_price: price,
                    entry_index: self.cursor,
                    reserved,
                });
                debug!("bar {}: opened {:?} at {}", self.cursor, direction, price);
            }

            // Strict reversal: realize the trade and flip
            (Some(position), Some(direction)) if direction == position.direction.opposite() => {
                let change = position.change_at(price);
                if !change.is_finite() {
                    // Zero entry price; leave everything untouched this bar
                    debug!("bar {}: non-finite change, close skipped", self.cursor);
                } else {
                    let pnl = position.reserved * change;
                    self.balance += pnl;
                    self.trades.push(TradeRecord {
                        direction: position.direction,
                        entry_price: position.entry_price,
                        exit_price: price,
                        entry_index: position.entry_index,
                        exit_index: self.cursor,
                        pnl,
                    });
                    // The locked stake rolls into the flipped position,
                    // re-marked to the current balance fraction
                    self.position = Some(Position {
                        direction,
                        entry_price: price,
                        entry_index: self.cursor,
                        reserved: self.balance * self.config.position_fraction,
                    });
                    debug!(
                        "bar {}: closed {:?} at {} (pnl {:.4}), flipped to {:?}",
                        self.cursor, position.direction, price, pnl, direction
                    );
                }
            }

            // Hold, or same-direction while open: no state change
            _ => {}
        }

        self.cursor += 1;
    }

    /// Replay a full series of prices and aligned actions.
    pub fn run(
        &mut self,
        prices: &[f64],
        actions: &[Action],
    ) -> Result<SimulationReport, SimError> {
        if prices.is_empty() {
            return Err(SimError::EmptyInput);
        }
        if prices.len() != actions.len() {
            return Err(SimError::LengthMismatch {
                prices: prices.len(),
                actions: actions.len(),
            });
        }

        self.reset();
        let mut balance_history = Vec::with_capacity(prices.len());

        for (&price, &action) in prices.iter().zip(actions.iter()) {
            self.step(price, action);
            balance_history.push(self.balance);
        }

        Ok(self.report(balance_history))
    }

    fn report(&self, balance_history: Vec<f64>) -> SimulationReport {
        let num_trades = self.trades.len();
        let num_profitable = self.trades.iter().filter(|t| t.pnl > 0.0).count();
        let mean_pnl = if num_trades > 0 {
            self.trades.iter().map(|t| t.pnl).sum::<f64>() / num_trades as f64
        } else {
            0.0
        };

        SimulationReport {
            initial_balance: self.config.initial_balance,
            final_balance: self.balance,
            num_trades,
            num_profitable,
            mean_pnl,
            trades: self.trades.clone(),
            balance_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trading::Direction;

    fn simulator(initial: f64, fraction: f64) -> TradeSimulator {
        TradeSimulator::new(SimulatorConfig::new(initial, fraction).unwrap()).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert!(SimulatorConfig::new(1000.0, -0.1).is_err());
        assert!(SimulatorConfig::new(1000.0, 0.0).is_err());
        assert!(SimulatorConfig::new(1000.0, 1.5).is_err());
        assert!(SimulatorConfig::new(1000.0, f64::NAN).is_err());
        assert!(SimulatorConfig::new(0.0, 0.1).is_err());
        assert!(SimulatorConfig::new(-100.0, 0.1).is_err());
        assert!(SimulatorConfig::new(1000.0, 1.0).is_ok());
    }

    #[test]
    fn test_empty_input_refused() {
        let mut sim = simulator(1000.0, 0.1);
        assert!(matches!(sim.run(&[], &[]), Err(SimError::EmptyInput)));
    }

    #[test]
    fn test_length_mismatch_refused() {
        let mut sim = simulator(1000.0, 0.1);
        let result = sim.run(&[100.0, 101.0], &[Action::Hold]);
        assert!(matches!(result, Err(SimError::LengthMismatch { .. })));
    }

    #[test]
    fn test_all_hold_changes_nothing() {
        let mut sim = simulator(1000.0, 0.1);
        let prices = vec![100.0, 101.0, 99.0, 102.0];
        let actions = vec![Action::Hold; 4];

        let report = sim.run(&prices, &actions).unwrap();
        assert_eq!(report.final_balance, 1000.0);
        assert_eq!(report.num_trades, 0);
        assert!(sim.open_position().is_none());
    }

    #[test]
    fn test_at_most_one_position() {
        let mut sim = simulator(1000.0, 0.1);
        let actions = [
            Action::Buy,
            Action::Buy,
            Action::Sell,
            Action::Sell,
            Action::Buy,
            Action::Hold,
        ];
        for (i, &action) in actions.iter().enumerate() {
            sim.step(100.0 + i as f64, action);
            // Option type makes >1 impossible; check it stays sane anyway
            assert!(sim.open_position().is_some() || sim.trades().is_empty());
        }
        assert!(sim.open_position().is_some());
    }

    #[test]
    fn test_same_direction_is_no_op() {
        let mut sim = simulator(1000.0, 0.1);
        sim.step(100.0, Action::Buy);
        let balance_after_open = sim.balance();
        let reserved = sim.open_position().unwrap().reserved;

        sim.step(110.0, Action::Buy);
        assert_eq!(sim.balance(), balance_after_open);
        assert_eq!(sim.open_position().unwrap().reserved, reserved);
        assert_eq!(sim.open_position().unwrap().entry_price, 100.0);
        assert!(sim.trades().is_empty());
    }

    #[test]
    fn test_long_round_trip_pnl() {
        let mut sim = simulator(1500.0, 0.1);
        sim.step(100.0, Action::Buy);
        sim.step(110.0, Action::Sell);

        let trades = sim.trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].direction, Direction::Long);
        // change is exactly 0.10, stake exactly 150
        assert_eq!(trades[0].pnl, 15.0);
    }

    #[test]
    fn test_short_round_trip_pnl() {
        let mut sim = simulator(1500.0, 0.1);
        sim.step(100.0, Action::Sell);
        sim.step(110.0, Action::Buy);

        let trades = sim.trades();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].direction, Direction::Short);
        assert_eq!(trades[0].pnl, -15.0);
    }

    #[test]
    fn test_zero_entry_price_close_skipped() {
        let mut sim = simulator(1000.0, 0.1);
        sim.step(0.0, Action::Buy);
        let balance_after_open = sim.balance();

        sim.step(50.0, Action::Sell);
        assert_eq!(sim.balance(), balance_after_open);
        assert!(sim.trades().is_empty());
        let position = sim.open_position().unwrap();
        assert_eq!(position.direction, Direction::Long);
        assert_eq!(position.entry_price, 0.0);
    }

    #[test]
    fn test_reference_scenario() {
        // prices and actions from the reference walk-through: one long
        // opened at 100, realized at 105, short left open at the end
        let prices = vec![100.0, 100.0, 100.0, 105.0, 105.0, 105.0, 95.0, 95.0, 95.0, 95.0];
        let mut actions = vec![Action::Hold; 10];
        actions[0] = Action::Buy;
        actions[3] = Action::Sell;

        let mut sim = simulator(1500.0, 0.1);
        let report = sim.run(&prices, &actions).unwrap();

        assert_eq!(report.num_trades, 1);
        let trade = &report.trades[0];
        assert_eq!(trade.entry_price, 100.0);
        assert_eq!(trade.exit_price, 105.0);
        assert_eq!(trade.pnl, 7.5);

        // 1500 - 150 reserved + 7.5 pnl
        assert_eq!(report.final_balance, 1357.5);
        assert_eq!(report.num_profitable, 1);

        // The reversal left a short open, unrealized
        let position = sim.open_position().unwrap();
        assert_eq!(position.direction, Direction::Short);
        assert_eq!(position.entry_price, 105.0);
    }

    #[test]
    fn test_end_of_series_position_not_settled() {
        let mut sim = simulator(1000.0, 0.1);
        let report = sim
            .run(&[100.0, 200.0], &[Action::Buy, Action::Hold])
            .unwrap();

        // Paper profit is large, but the reported balance excludes it
        assert_eq!(report.num_trades, 0);
        assert_eq!(report.final_balance, 900.0);
        assert!(sim.open_position().is_some());
    }

    #[test]
    fn test_idempotent_reruns() {
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + (i as f64 * 0.7).sin() * 10.0).collect();
        let actions: Vec<Action> = (0..50)
            .map(|i| match i % 7 {
                0 => Action::Buy,
                3 => Action::Sell,
                _ => Action::Hold,
            })
            .collect();

        let mut sim = simulator(2000.0, 0.1);
        let first = sim.run(&prices, &actions).unwrap();
        let second = sim.run(&prices, &actions).unwrap();

        assert_eq!(first.final_balance.to_bits(), second.final_balance.to_bits());
        assert_eq!(first.trades, second.trades);
        assert_eq!(first.balance_history, second.balance_history);
    }

    #[test]
    fn test_mean_pnl() {
        let mut sim = simulator(1000.0, 0.5);
        let prices = vec![100.0, 110.0, 110.0, 99.0];
        let actions = vec![Action::Buy, Action::Sell, Action::Hold, Action::Buy];
        let report = sim.run(&prices, &actions).unwrap();

        assert_eq!(report.num_trades, 2);
        let expected = report.trades.iter().map(|t| t.pnl).sum::<f64>() / 2.0;
        assert_eq!(report.mean_pnl, expected);
    }
}
