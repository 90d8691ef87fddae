//! Indicator frame: a price series extended with one row of derived values per bar.
//!
//! Values inside a warm-up window are `None`. Downstream consumers never see
//! those: [`IndicatorFrame::tradable_rows`] only yields rows where every
//! field the active rule reads is defined, as a scalar [`IndicatorSnapshot`].

use crate::domain::error::QuantsignalError;
use crate::domain::indicator::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, IndicatorConfig,
};
use crate::domain::ohlcv::PriceBar;
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::SignalRule;

/// Column names, in the order they are reported.
pub const COLUMNS: [&str; 9] = [
    "RSI",
    "SMA_fast",
    "SMA_slow",
    "MACD",
    "MACD_signal",
    "MACD_hist",
    "BB_high",
    "BB_mid",
    "BB_low",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorValues {
    pub rsi: Option<f64>,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_high: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_low: Option<f64>,
}

/// A scalar row. Fields the active rule does not read may be NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub rsi: f64,
    pub sma_fast: f64,
    pub sma_slow: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_hist: f64,
    pub bb_high: f64,
    pub bb_mid: f64,
    pub bb_low: f64,
}

impl IndicatorValues {
    pub fn as_array(&self) -> [Option<f64>; 9] {
        [
            self.rsi,
            self.sma_fast,
            self.sma_slow,
            self.macd,
            self.macd_signal,
            self.macd_hist,
            self.bb_high,
            self.bb_mid,
            self.bb_low,
        ]
    }

    /// Requires all nine fields.
    pub fn snapshot(&self, close: f64) -> Option<IndicatorSnapshot> {
        Some(IndicatorSnapshot {
            close,
            rsi: self.rsi?,
            sma_fast: self.sma_fast?,
            sma_slow: self.sma_slow?,
            macd: self.macd?,
            macd_signal: self.macd_signal?,
            macd_hist: self.macd_hist?,
            bb_high: self.bb_high?,
            bb_mid: self.bb_mid?,
            bb_low: self.bb_low?,
        })
    }

    /// Requires RSI and both SMAs; MACD and band fields still warming up are NaN.
    pub fn trend_snapshot(&self, close: f64) -> Option<IndicatorSnapshot> {
        Some(IndicatorSnapshot {
            close,
            rsi: self.rsi?,
            sma_fast: self.sma_fast?,
            sma_slow: self.sma_slow?,
            macd: self.macd.unwrap_or(f64::NAN),
            macd_signal: self.macd_signal.unwrap_or(f64::NAN),
            macd_hist: self.macd_hist.unwrap_or(f64::NAN),
            bb_high: self.bb_high.unwrap_or(f64::NAN),
            bb_mid: self.bb_mid.unwrap_or(f64::NAN),
            bb_low: self.bb_low.unwrap_or(f64::NAN),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow {
    pub bar: PriceBar,
    pub values: IndicatorValues,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorFrame {
    pub rows: Vec<FrameRow>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows `rule` can evaluate, paired with their scalar snapshot.
    pub fn tradable_rows<'a>(
        &'a self,
        rule: &'a SignalRule,
    ) -> impl Iterator<Item = (&'a PriceBar, IndicatorSnapshot)> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| rule.snapshot(&row.values, row.bar.close).map(|snap| (&row.bar, snap)))
    }

    pub fn tradable_count(&self, rule: &SignalRule) -> usize {
        self.tradable_rows(rule).count()
    }
}

/// Computes the fixed indicator set for a configuration.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Returns `InsufficientData` when the series cannot produce a single row `rule` can evaluate.
    pub fn check_sufficient(
        &self,
        symbol: &str,
        series: &PriceSeries,
        rule: &SignalRule,
    ) -> Result<(), QuantsignalError> {
        let minimum = rule.required_warmup(&self.config);
        if series.len() < minimum {
            return Err(QuantsignalError::InsufficientData {
                symbol: symbol.to_string(),
                bars: series.len(),
                minimum,
            });
        }
        Ok(())
    }

    pub fn compute(&self, series: &PriceSeries) -> IndicatorFrame {
        let c = &self.config;
        let closes = series.closes();

        let rsi = calculate_rsi(&closes, c.rsi_period);
        let sma_fast = calculate_sma(&closes, c.sma_fast);
        let sma_slow = calculate_sma(&closes, c.sma_slow);
        let macd = calculate_macd(&closes, c.macd_fast, c.macd_slow, c.macd_signal);
        let bands = calculate_bollinger(&closes, c.bb_period, c.bb_stddev_mult);

        let rows = series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| FrameRow {
                bar: bar.clone(),
                values: IndicatorValues {
                    rsi: rsi[i],
                    sma_fast: sma_fast[i],
                    sma_slow: sma_slow[i],
                    macd: macd.line[i],
                    macd_signal: macd.signal[i],
                    macd_hist: macd.histogram[i],
                    bb_high: bands.upper[i],
                    bb_mid: bands.middle[i],
                    bb_low: bands.lower[i],
                },
            })
            .collect();

        IndicatorFrame { rows }
    }
}
