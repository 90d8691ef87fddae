//! Strategy configuration: the flat options bundle handed to the pipeline.

use crate::domain::indicator::IndicatorConfig;
use crate::domain::signal::SignalRule;
use crate::domain::simulator::DEFAULT_INITIAL_CAPITAL;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub name: String,
    pub indicators: IndicatorConfig,
    pub rule: SignalRule,
    pub initial_capital: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: "RSI/Bollinger/MACD confirmation".into(),
            indicators: IndicatorConfig::default(),
            rule: SignalRule::default(),
            initial_capital: DEFAULT_INITIAL_CAPITAL,
        }
    }
}
