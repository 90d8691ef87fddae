//! End-to-end analysis of one instrument: price filtering, indicators,
//! signals and the backtest, as a single pure call.

use rayon::prelude::*;

use crate::domain::error::QuantsignalError;
use crate::domain::frame::{IndicatorEngine, IndicatorFrame};
use crate::domain::ohlcv::PriceBar;
use crate::domain::price_series::PriceSeries;
use crate::domain::signal::{SignalGenerator, TimedSignal};
use crate::domain::simulator::{PositionSimulator, SimulationReport};
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone)]
pub struct Analysis {
    pub symbol: String,
    pub frame: IndicatorFrame,
    pub signals: Vec<TimedSignal>,
    pub report: SimulationReport,
    pub rejected_bars: usize,
    pub insufficient_data: bool,
}

impl Analysis {
    pub fn latest_signal(&self) -> Option<&TimedSignal> {
        let last_bar = self.frame.rows.last()?;
        self.signals
            .last()
            .filter(|s| s.timestamp == last_bar.bar.timestamp)
    }
}

pub fn analyze(
    symbol: &str,
    series: PriceSeries,
    config: &StrategyConfig,
) -> Result<Analysis, QuantsignalError> {
    config.indicators.validate()?;
    let simulator = PositionSimulator::new(config.initial_capital)?;
    let engine = IndicatorEngine::new(config.indicators.clone());
    let generator = SignalGenerator::new(config.rule);

    let (series, rejected) = series.retain_valid_prices();
    let frame = engine.compute(&series);

    if let Err(e) = engine.check_sufficient(symbol, &series, &config.rule) {
        tracing::warn!(%symbol, "{e}; no signals generated");
        return Ok(Analysis {
            symbol: symbol.to_string(),
            frame,
            signals: Vec::new(),
            report: SimulationReport::flat(config.initial_capital),
            rejected_bars: rejected.len(),
            insufficient_data: true,
        });
    }

    let signals = generator.generate(&frame);
    let bars: Vec<PriceBar> = frame
        .tradable_rows(&config.rule)
        .map(|(bar, _)| bar.clone())
        .collect();
    let report = simulator.run_timed(&bars, &signals)?;

    tracing::info!(
        %symbol,
        bars = series.len(),
        tradable = bars.len(),
        trades = report.trade_count,
        "analysis complete"
    );

    Ok(Analysis {
        symbol: symbol.to_string(),
        frame,
        signals,
        report,
        rejected_bars: rejected.len(),
        insufficient_data: false,
    })
}

/// Analyzes independent instruments in parallel. Output order follows input order.
pub fn analyze_many(
    inputs: Vec<(String, PriceSeries)>,
    config: &StrategyConfig,
) -> Vec<(String, Result<Analysis, QuantsignalError>)> {
    inputs
        .into_par_iter()
        .map(|(symbol, series)| {
            let result = analyze(&symbol, series, config);
            (symbol, result)
        })
        .collect()
}
