//! Configuration validation.
//!
//! Validates all config fields before any analysis runs.

use crate::domain::error::QuantsignalError;
use crate::ports::config_port::ConfigPort;

pub const KNOWN_RULES: [&str; 2] = ["confirmation", "rsi_trend"];
pub const KNOWN_SOURCES: [&str; 2] = ["csv", "yahoo"];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), QuantsignalError> {
    validate_data_config(config)?;
    validate_indicator_config(config)?;
    validate_strategy_config(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), QuantsignalError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    if !KNOWN_SOURCES.contains(&source.trim().to_lowercase().as_str()) {
        return Err(QuantsignalError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source '{}', expected one of {}", source, KNOWN_SOURCES.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), QuantsignalError> {
    for key in [
        "rsi_period",
        "sma_fast",
        "sma_slow",
        "bb_period",
        "macd_fast",
        "macd_slow",
        "macd_signal",
    ] {
        validate_positive_int(config, "indicators", key)?;
    }

    let mult = config.get_double("indicators", "bb_stddev_mult", 2.0);
    if mult <= 0.0 {
        return Err(QuantsignalError::ConfigInvalid {
            section: "indicators".to_string(),
            key: "bb_stddev_mult".to_string(),
            reason: "bb_stddev_mult must be positive".to_string(),
        });
    }

    let fast = config.get_int("indicators", "sma_fast", 20);
    let slow = config.get_int("indicators", "sma_slow", 50);
    if fast >= slow {
        tracing::warn!(fast, slow, "sma_fast is not shorter than sma_slow");
    }
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), QuantsignalError> {
    let capital = config.get_double("strategy", "initial_capital", 10_000.0);
    if capital <= 0.0 {
        return Err(QuantsignalError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }

    let rule = config
        .get_string("strategy", "rule")
        .unwrap_or_else(|| "confirmation".to_string());
    match rule.trim().to_lowercase().as_str() {
        "confirmation" => {
            let buy = validate_threshold(config, "buy_rsi", 35.0)?;
            let sell = validate_threshold(config, "sell_rsi", 65.0)?;
            if buy >= sell {
                return Err(QuantsignalError::ConfigInvalid {
                    section: "strategy".to_string(),
                    key: "buy_rsi".to_string(),
                    reason: "buy_rsi must be below sell_rsi".to_string(),
                });
            }
        }
        "rsi_trend" => {
            let oversold = validate_threshold(config, "oversold", 30.0)?;
            let overbought = validate_threshold(config, "overbought", 70.0)?;
            if oversold >= overbought {
                return Err(QuantsignalError::ConfigInvalid {
                    section: "strategy".to_string(),
                    key: "oversold".to_string(),
                    reason: "oversold must be below overbought".to_string(),
                });
            }
        }
        other => {
            return Err(QuantsignalError::ConfigInvalid {
                section: "strategy".to_string(),
                key: "rule".to_string(),
                reason: format!("unknown rule '{}', expected one of {}", other, KNOWN_RULES.join(", ")),
            });
        }
    }
    Ok(())
}

fn validate_positive_int(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), QuantsignalError> {
    if let Some(raw) = config.get_string(section, key) {
        match raw.trim().parse::<i64>() {
            Ok(v) if v > 0 => {}
            _ => {
                return Err(QuantsignalError::ConfigInvalid {
                    section: section.to_string(),
                    key: key.to_string(),
                    reason: format!("{} must be a positive integer", key),
                });
            }
        }
    }
    Ok(())
}

fn validate_threshold(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, QuantsignalError> {
    let value = config.get_double("strategy", key, default);
    if !(0.0..=100.0).contains(&value) {
        return Err(QuantsignalError::ConfigInvalid {
            section: "strategy".to_string(),
            key: key.to_string(),
            reason: format!("{} must be between 0 and 100", key),
        });
    }
    Ok(value)
}
