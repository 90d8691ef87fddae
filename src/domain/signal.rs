//! Per-bar trading signals.
//!
//! A rule looks at a single [`IndicatorSnapshot`] and nothing else: no
//! neighbouring bars, no simulation state. All comparisons against
//! thresholds are strict.

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::frame::{IndicatorFrame, IndicatorSnapshot, IndicatorValues};
use crate::domain::indicator::IndicatorConfig;

pub const DEFAULT_BUY_RSI: f64 = 35.0;
pub const DEFAULT_SELL_RSI: f64 = 65.0;
pub const DEFAULT_OVERSOLD: f64 = 30.0;
pub const DEFAULT_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Buy,
    Sell,
    None,
}

impl Signal {
    /// Numeric encoding used in exported frames: 1, -1 or 0.
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::None => 0,
        }
    }

    pub fn is_actionable(self) -> bool {
        !matches!(self, Signal::None)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => f.pad("BUY"),
            Signal::Sell => f.pad("SELL"),
            Signal::None => f.pad("NONE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalRule {
    /// RSI, Bollinger band and MACD histogram must all agree.
    Confirmation { buy_rsi: f64, sell_rsi: f64 },
    /// Oversold RSI in an uptrend (fast SMA above slow) buys; overbought RSI sells.
    RsiTrend { oversold: f64, overbought: f64 },
}

impl Default for SignalRule {
    fn default() -> Self {
        SignalRule::Confirmation {
            buy_rsi: DEFAULT_BUY_RSI,
            sell_rsi: DEFAULT_SELL_RSI,
        }
    }
}

impl SignalRule {
    pub fn rsi_trend() -> Self {
        SignalRule::RsiTrend {
            oversold: DEFAULT_OVERSOLD,
            overbought: DEFAULT_OVERBOUGHT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SignalRule::Confirmation { .. } => "confirmation",
            SignalRule::RsiTrend { .. } => "rsi_trend",
        }
    }

    /// Bars needed before this rule has a row to evaluate. The confirmation
    /// rule waits for the full frame; the trend rule only for RSI and the SMAs.
    pub fn required_warmup(&self, config: &IndicatorConfig) -> usize {
        match self {
            SignalRule::Confirmation { .. } => config.warmup_bars(),
            SignalRule::RsiTrend { .. } => config.trend_warmup_bars(),
        }
    }

    /// The row this rule evaluates, or `None` while a field it needs is undefined.
    pub fn snapshot(&self, values: &IndicatorValues, close: f64) -> Option<IndicatorSnapshot> {
        match self {
            SignalRule::Confirmation { .. } => values.snapshot(close),
            SignalRule::RsiTrend { .. } => values.trend_snapshot(close),
        }
    }

    pub fn evaluate(&self, row: &IndicatorSnapshot) -> Signal {
        match *self {
            SignalRule::Confirmation { buy_rsi, sell_rsi } => {
                if row.rsi < buy_rsi && row.close <= row.bb_low && row.macd_hist > 0.0 {
                    Signal::Buy
                } else if row.rsi > sell_rsi && row.close >= row.bb_high && row.macd_hist < 0.0 {
                    Signal::Sell
                } else {
                    Signal::None
                }
            }
            SignalRule::RsiTrend {
                oversold,
                overbought,
            } => {
                if row.rsi < oversold && row.sma_fast > row.sma_slow {
                    Signal::Buy
                } else if row.rsi > overbought {
                    Signal::Sell
                } else {
                    Signal::None
                }
            }
        }
    }

    /// Columnar formulation: builds boolean masks over all rows, then
    /// resolves them. Produces the same output as mapping [`Self::evaluate`].
    pub fn evaluate_batch(&self, rows: &[IndicatorSnapshot]) -> Vec<Signal> {
        let (buy_mask, sell_mask): (Vec<bool>, Vec<bool>) = match *self {
            SignalRule::Confirmation { buy_rsi, sell_rsi } => rows
                .iter()
                .map(|r| {
                    (
                        r.rsi < buy_rsi && r.close <= r.bb_low && r.macd_hist > 0.0,
                        r.rsi > sell_rsi && r.close >= r.bb_high && r.macd_hist < 0.0,
                    )
                })
                .unzip(),
            SignalRule::RsiTrend {
                oversold,
                overbought,
            } => rows
                .iter()
                .map(|r| (r.rsi < oversold && r.sma_fast > r.sma_slow, r.rsi > overbought))
                .unzip(),
        };

        buy_mask
            .into_iter()
            .zip(sell_mask)
            .map(|(buy, sell)| match (buy, sell) {
                (true, _) => Signal::Buy,
                (false, true) => Signal::Sell,
                (false, false) => Signal::None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSignal {
    pub timestamp: NaiveDateTime,
    pub close: f64,
    pub signal: Signal,
}

#[derive(Debug, Clone)]
pub struct SignalGenerator {
    rule: SignalRule,
}

impl SignalGenerator {
    pub fn new(rule: SignalRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &SignalRule {
        &self.rule
    }

    /// One signal per tradable row of the frame; warm-up rows are skipped.
    pub fn generate(&self, frame: &IndicatorFrame) -> Vec<TimedSignal> {
        frame
            .tradable_rows(&self.rule)
            .map(|(bar, snapshot)| TimedSignal {
                timestamp: bar.timestamp,
                close: bar.close,
                signal: self.rule.evaluate(&snapshot),
            })
            .collect()
    }
}
