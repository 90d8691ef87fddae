//! Technical indicator implementations.
//!
//! Every indicator is a pure function over a slice of closing prices and
//! returns exactly one entry per input bar. Entries inside the warm-up
//! period are `None`; once defined they are plain scalars.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{calculate_bollinger, BollingerSeries};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;

use crate::domain::error::QuantsignalError;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_SMA_FAST: usize = 20;
pub const DEFAULT_SMA_SLOW: usize = 50;
pub const DEFAULT_BB_PERIOD: usize = 20;
pub const DEFAULT_BB_STDDEV_MULT: f64 = 2.0;

/// Indicator periods, fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub sma_fast: usize,
    pub sma_slow: usize,
    pub bb_period: usize,
    pub bb_stddev_mult: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: DEFAULT_RSI_PERIOD,
            sma_fast: DEFAULT_SMA_FAST,
            sma_slow: DEFAULT_SMA_SLOW,
            bb_period: DEFAULT_BB_PERIOD,
            bb_stddev_mult: DEFAULT_BB_STDDEV_MULT,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
        }
    }
}

impl IndicatorConfig {
    /// Number of bars needed before every indicator in the frame is defined.
    pub fn warmup_bars(&self) -> usize {
        let macd = macd::histogram_warmup(self.macd_fast, self.macd_slow, self.macd_signal) + 1;
        self.trend_warmup_bars().max(self.bb_period).max(macd)
    }

    /// Bars needed before RSI and both SMAs are defined.
    pub fn trend_warmup_bars(&self) -> usize {
        (self.rsi_period + 1).max(self.sma_fast).max(self.sma_slow)
    }

    pub fn validate(&self) -> Result<(), QuantsignalError> {
        let periods = [
            ("rsi_period", self.rsi_period),
            ("sma_fast", self.sma_fast),
            ("sma_slow", self.sma_slow),
            ("bb_period", self.bb_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        for (key, period) in periods {
            if period == 0 {
                return Err(QuantsignalError::ConfigInvalid {
                    section: "indicators".into(),
                    key: key.into(),
                    reason: format!("{key} must be a positive integer"),
                });
            }
        }
        if !self.bb_stddev_mult.is_finite() || self.bb_stddev_mult <= 0.0 {
            return Err(QuantsignalError::ConfigInvalid {
                section: "indicators".into(),
                key: "bb_stddev_mult".into(),
                reason: "bb_stddev_mult must be positive".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_conventional_periods() {
        let c = IndicatorConfig::default();
        assert_eq!(c.rsi_period, 14);
        assert_eq!(c.sma_fast, 20);
        assert_eq!(c.sma_slow, 50);
        assert_eq!(c.bb_period, 20);
        assert_eq!(c.macd_fast, 12);
        assert_eq!(c.macd_slow, 26);
        assert_eq!(c.macd_signal, 9);
    }

    #[test]
    fn warmup_is_longest_window() {
        // SMA(50) dominates MACD(12,26,9) = 34 bars and RSI(14) = 15 bars.
        assert_eq!(IndicatorConfig::default().warmup_bars(), 50);

        let short = IndicatorConfig {
            sma_fast: 3,
            sma_slow: 5,
            bb_period: 5,
            ..IndicatorConfig::default()
        };
        assert_eq!(short.warmup_bars(), 34);
        assert_eq!(short.trend_warmup_bars(), 15);
    }

    #[test]
    fn trend_warmup_ignores_macd_and_bands() {
        let c = IndicatorConfig {
            rsi_period: 3,
            sma_fast: 2,
            sma_slow: 8,
            bb_period: 30,
            ..IndicatorConfig::default()
        };
        assert_eq!(c.trend_warmup_bars(), 8);
        assert_eq!(c.warmup_bars(), 34);
        assert_eq!(IndicatorConfig::default().trend_warmup_bars(), 50);
    }

    #[test]
    fn validate_rejects_zero_period() {
        let c = IndicatorConfig {
            bb_period: 0,
            ..IndicatorConfig::default()
        };
        match c.validate() {
            Err(QuantsignalError::ConfigInvalid { key, .. }) => assert_eq!(key, "bb_period"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_non_positive_multiplier() {
        let c = IndicatorConfig {
            bb_stddev_mult: 0.0,
            ..IndicatorConfig::default()
        };
        assert!(c.validate().is_err());
        assert!(IndicatorConfig::default().validate().is_ok());
    }
}
