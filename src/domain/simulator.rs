//! Single-position backtest simulator.
//!
//! Replays a signal sequence against the bars it was generated from. The
//! account is either entirely in cash (`Flat`) or entirely in units
//! (`Holding`); BUY converts all cash at the bar's close, SELL liquidates all
//! units at the bar's close. A position still open after the last bar is
//! liquidated at the last close without counting as a trade.
//!
//! Each run owns a fresh [`SimulationState`]; nothing is shared between runs.

use chrono::NaiveDateTime;

use crate::domain::error::QuantsignalError;
use crate::domain::ohlcv::PriceBar;
use crate::domain::signal::{Signal, TimedSignal};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Holding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

/// One executed conversion between cash and units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub timestamp: NaiveDateTime,
    pub side: Side,
    pub price: f64,
    pub units: f64,
    pub cash_after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub cash: f64,
    pub units_held: f64,
    pub trade_count: usize,
}

impl SimulationState {
    pub fn new(initial_capital: f64) -> Self {
        Self {
            cash: initial_capital,
            units_held: 0.0,
            trade_count: 0,
        }
    }

    pub fn position(&self) -> PositionState {
        if self.units_held > 0.0 {
            PositionState::Holding
        } else {
            PositionState::Flat
        }
    }

    /// Mark-to-market value at `price`.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.units_held * price
    }

    /// Applies one bar's signal. Returns the fill if the signal changed the position.
    pub fn apply(&mut self, timestamp: NaiveDateTime, close: f64, signal: Signal) -> Option<Fill> {
        match (self.position(), signal) {
            (PositionState::Flat, Signal::Buy) => {
                let units = self.cash / close;
                self.units_held = units;
                self.cash = 0.0;
                self.trade_count += 1;
                Some(Fill {
                    timestamp,
                    side: Side::Buy,
                    price: close,
                    units,
                    cash_after: self.cash,
                })
            }
            (PositionState::Holding, Signal::Sell) => Some(self.liquidate(timestamp, close, true)),
            _ => None,
        }
    }

    fn liquidate(&mut self, timestamp: NaiveDateTime, close: f64, counted: bool) -> Fill {
        let units = self.units_held;
        self.cash = units * close;
        self.units_held = 0.0;
        if counted {
            self.trade_count += 1;
        }
        Fill {
            timestamp,
            side: Side::Sell,
            price: close,
            units,
            cash_after: self.cash,
        }
    }

    /// Closes any open position at the final close. Not a strategy trade.
    pub fn finalize(&mut self, timestamp: NaiveDateTime, close: f64) -> Option<Fill> {
        match self.position() {
            PositionState::Holding => Some(self.liquidate(timestamp, close, false)),
            PositionState::Flat => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub initial_capital: f64,
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub trade_count: usize,
    pub fills: Vec<Fill>,
    pub forced_exit: Option<Fill>,
    pub equity_curve: Vec<EquityPoint>,
}

impl SimulationReport {
    /// Result of a run with nothing to trade on.
    pub fn flat(initial_capital: f64) -> Self {
        Self {
            initial_capital,
            final_balance: initial_capital,
            total_return_pct: 0.0,
            trade_count: 0,
            fills: Vec::new(),
            forced_exit: None,
            equity_curve: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PositionSimulator {
    initial_capital: f64,
}

impl PositionSimulator {
    pub fn new(initial_capital: f64) -> Result<Self, QuantsignalError> {
        if !initial_capital.is_finite() || initial_capital <= 0.0 {
            return Err(QuantsignalError::ConfigInvalid {
                section: "strategy".into(),
                key: "initial_capital".into(),
                reason: "initial_capital must be positive".into(),
            });
        }
        Ok(Self { initial_capital })
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Runs the state machine over bars and signals aligned one-to-one.
    ///
    /// The inputs are checked in full before any state is created, so an
    /// error never leaves a partial result behind.
    pub fn run(&self, bars: &[PriceBar], signals: &[Signal]) -> Result<SimulationReport, QuantsignalError> {
        if bars.len() != signals.len() {
            return Err(QuantsignalError::MisalignedSeries {
                reason: format!("{} bars but {} signals", bars.len(), signals.len()),
            });
        }
        if let Some(bar) = bars.iter().find(|b| !b.is_tradable_price()) {
            return Err(QuantsignalError::InvalidPrice {
                timestamp: bar.timestamp,
                close: bar.close,
            });
        }

        let Some(last) = bars.last() else {
            return Ok(SimulationReport::flat(self.initial_capital));
        };

        let mut state = SimulationState::new(self.initial_capital);
        let mut fills = Vec::new();
        let mut equity_curve = Vec::with_capacity(bars.len());

        for (bar, &signal) in bars.iter().zip(signals) {
            if let Some(fill) = state.apply(bar.timestamp, bar.close, signal) {
                tracing::debug!(timestamp = %fill.timestamp, side = ?fill.side, price = fill.price, "fill");
                fills.push(fill);
            }
            equity_curve.push(EquityPoint {
                timestamp: bar.timestamp,
                equity: state.equity(bar.close),
            });
        }

        let forced_exit = state.finalize(last.timestamp, last.close);
        let final_balance = state.cash;

        Ok(SimulationReport {
            initial_capital: self.initial_capital,
            final_balance,
            total_return_pct: (final_balance - self.initial_capital) / self.initial_capital * 100.0,
            trade_count: state.trade_count,
            fills,
            forced_exit,
            equity_curve,
        })
    }

    /// Runs against signals carrying their own timestamps, requiring the
    /// timestamps to match the bars exactly.
    pub fn run_timed(&self, bars: &[PriceBar], signals: &[TimedSignal]) -> Result<SimulationReport, QuantsignalError> {
        if bars.len() != signals.len() {
            return Err(QuantsignalError::MisalignedSeries {
                reason: format!("{} bars but {} signals", bars.len(), signals.len()),
            });
        }
        if let Some((bar, sig)) = bars
            .iter()
            .zip(signals)
            .find(|(bar, sig)| bar.timestamp != sig.timestamp)
        {
            return Err(QuantsignalError::MisalignedSeries {
                reason: format!("bar at {} paired with signal at {}", bar.timestamp, sig.timestamp),
            });
        }

        let plain: Vec<Signal> = signals.iter().map(|s| s.signal).collect();
        self.run(bars, &plain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};

    fn ts(day: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::days(day)
    }

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                timestamp: ts(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    fn sim() -> PositionSimulator {
        PositionSimulator::new(DEFAULT_INITIAL_CAPITAL).unwrap()
    }

    #[test]
    fn buy_then_sell_round_trip() {
        let report = sim()
            .run(
                &bars(&[100.0, 90.0, 110.0]),
                &[Signal::None, Signal::Buy, Signal::Sell],
            )
            .unwrap();

        assert_eq!(report.trade_count, 2);
        assert_eq!(report.fills.len(), 2);
        assert_abs_diff_eq!(report.fills[0].units, 10_000.0 / 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.fills[0].price, 90.0);
        assert_abs_diff_eq!(report.final_balance, 12_222.222_222, epsilon = 1e-5);
        assert_abs_diff_eq!(report.total_return_pct, 22.222_222, epsilon = 1e-5);
        assert!(report.forced_exit.is_none());
    }

    #[test]
    fn all_none_stays_flat() {
        let report = sim()
            .run(&bars(&[100.0, 101.0, 99.0]), &[Signal::None; 3])
            .unwrap();
        assert_eq!(report.trade_count, 0);
        assert_eq!(report.final_balance, DEFAULT_INITIAL_CAPITAL);
        assert_eq!(report.total_return_pct, 0.0);
        assert!(report.fills.is_empty());
    }

    #[test]
    fn ending_in_position_is_force_liquidated_without_counting() {
        let report = sim()
            .run(&bars(&[100.0, 105.0]), &[Signal::Buy, Signal::None])
            .unwrap();

        assert_eq!(report.trade_count, 1);
        assert_abs_diff_eq!(report.final_balance, 10_500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(report.total_return_pct, 5.0, epsilon = 1e-9);
        let forced = report.forced_exit.unwrap();
        assert_eq!(forced.side, Side::Sell);
        assert_eq!(forced.timestamp, ts(1));
        assert_abs_diff_eq!(forced.price, 105.0);
    }

    #[test]
    fn sell_while_flat_and_buy_while_holding_are_noops() {
        let report = sim()
            .run(
                &bars(&[100.0, 50.0, 200.0, 100.0]),
                &[Signal::Sell, Signal::Buy, Signal::Buy, Signal::Sell],
            )
            .unwrap();

        assert_eq!(report.trade_count, 2);
        assert_abs_diff_eq!(report.fills[0].price, 50.0);
        assert_abs_diff_eq!(report.final_balance, 20_000.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_input_returns_initial_capital() {
        let report = sim().run(&[], &[]).unwrap();
        assert_eq!(report, SimulationReport::flat(DEFAULT_INITIAL_CAPITAL));
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = sim().run(&bars(&[100.0, 101.0]), &[Signal::Buy]).unwrap_err();
        assert!(matches!(err, QuantsignalError::MisalignedSeries { .. }));
    }

    #[test]
    fn timestamp_mismatch_is_rejected() {
        let b = bars(&[100.0, 101.0]);
        let signals = vec![
            TimedSignal {
                timestamp: ts(0),
                close: 100.0,
                signal: Signal::Buy,
            },
            TimedSignal {
                timestamp: ts(5),
                close: 101.0,
                signal: Signal::Sell,
            },
        ];
        let err = sim().run_timed(&b, &signals).unwrap_err();
        assert!(matches!(err, QuantsignalError::MisalignedSeries { .. }));
    }

    #[test]
    fn zero_price_is_rejected_before_simulation() {
        let err = sim()
            .run(&bars(&[100.0, 0.0]), &[Signal::None, Signal::Buy])
            .unwrap_err();
        match err {
            QuantsignalError::InvalidPrice { timestamp, close } => {
                assert_eq!(timestamp, ts(1));
                assert_eq!(close, 0.0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn equity_is_continuous_across_fills() {
        let mut state = SimulationState::new(1_000.0);
        let before = state.equity(40.0);
        state.apply(ts(0), 40.0, Signal::Buy).unwrap();
        assert_abs_diff_eq!(state.equity(40.0), before, epsilon = 1e-9);
        assert_eq!(state.position(), PositionState::Holding);
        assert_eq!(state.cash, 0.0);

        let before = state.equity(55.0);
        state.apply(ts(1), 55.0, Signal::Sell).unwrap();
        assert_abs_diff_eq!(state.equity(55.0), before, epsilon = 1e-9);
        assert_eq!(state.position(), PositionState::Flat);
        assert_eq!(state.units_held, 0.0);
    }

    #[test]
    fn finalize_when_flat_does_nothing() {
        let mut state = SimulationState::new(1_000.0);
        assert!(state.finalize(ts(0), 10.0).is_none());
        assert_eq!(state.cash, 1_000.0);
    }

    #[test]
    fn equity_curve_has_one_point_per_bar() {
        let report = sim()
            .run(&bars(&[100.0, 110.0, 121.0]), &[Signal::Buy, Signal::None, Signal::None])
            .unwrap();
        let equity: Vec<f64> = report.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equity.len(), 3);
        assert_abs_diff_eq!(equity[0], 10_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(equity[1], 11_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(equity[2], 12_100.0, epsilon = 1e-9);
    }

    #[test]
    fn non_positive_capital_is_rejected() {
        assert!(PositionSimulator::new(0.0).is_err());
        assert!(PositionSimulator::new(-5.0).is_err());
        assert!(PositionSimulator::new(f64::NAN).is_err());
    }
}
